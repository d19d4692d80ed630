mod levels;
mod profile;
mod rules;

pub use levels::{classify, RiskClass, RiskLevel};

use super::domain::{ProfileAttributes, Questionnaire};
use profile::profile_components;
use rules::score_questionnaire;
use serde::{Deserialize, Serialize};

/// Rule that contributed to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRule {
    ChestPain,
    Sleep,
    WorkHours,
    Activity,
    Diet,
    StreetFood,
    Sweets,
    Smoking,
    Alcohol,
    Diabetes,
    KidneyDisease,
    FamilyHistory,
    HeartCondition,
    Age,
}

/// Discrete, non-zero contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub rule: RiskRule,
    pub delta: u32,
    pub notes: String,
}

/// Immediate result of scoring one questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_class: RiskClass,
    pub risk_factors: Vec<String>,
    pub positive_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

/// Second scoring phase: the base result plus what the stored profile adds.
///
/// The base result is carried unchanged; the adjusted fields are separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAdjustedAssessment {
    pub base: AssessmentResult,
    pub profile_found: bool,
    pub profile_components: Vec<ScoreComponent>,
    pub adjusted_score: u32,
    pub adjusted_level: RiskLevel,
    pub adjusted_class: RiskClass,
}

impl ProfileAdjustedAssessment {
    pub fn profile_delta(&self) -> u32 {
        self.adjusted_score.saturating_sub(self.base.risk_score)
    }
}

/// Stateless scorer for the heart-health questionnaire.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEngine;

impl RiskEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, questionnaire: &Questionnaire) -> AssessmentResult {
        let tally = score_questionnaire(questionnaire);
        let (risk_level, risk_class) = classify(tally.score);

        AssessmentResult {
            risk_score: tally.score,
            risk_level,
            risk_class,
            risk_factors: tally.risk_factors,
            positive_factors: tally.positive_factors,
            recommendations: tally.recommendations,
            components: tally.components,
        }
    }

    /// Combine a base result with the owner's profile, if one exists.
    pub fn adjust_for_profile(
        &self,
        base: AssessmentResult,
        profile: Option<&ProfileAttributes>,
    ) -> ProfileAdjustedAssessment {
        let profile_components = profile.map(profile_components).unwrap_or_default();
        let adjusted_score = profile_components
            .iter()
            .fold(base.risk_score, |score, component| {
                score.saturating_add(component.delta)
            });
        let (adjusted_level, adjusted_class) = classify(adjusted_score);

        ProfileAdjustedAssessment {
            base,
            profile_found: profile.is_some(),
            profile_components,
            adjusted_score,
            adjusted_level,
            adjusted_class,
        }
    }
}
