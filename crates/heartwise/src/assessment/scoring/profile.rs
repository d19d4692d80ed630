use super::super::domain::ProfileAttributes;
use super::{RiskRule, ScoreComponent};

const SENIOR_AGE: u32 = 60;
const MIDDLE_AGE: u32 = 45;

/// Contributions from stored profile attributes.
///
/// Age bands are exclusive and checked from the highest bound down, so a
/// 61-year-old gets the senior weight rather than the middle-age one.
pub(crate) fn profile_components(profile: &ProfileAttributes) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    let conditions = [
        (profile.diabetes, RiskRule::Diabetes, 20, "Diabetes"),
        (
            profile.kidney_disease,
            RiskRule::KidneyDisease,
            15,
            "Kidney disease",
        ),
        (
            profile.family_history,
            RiskRule::FamilyHistory,
            10,
            "Family history of heart disease",
        ),
        (
            profile.heart_condition,
            RiskRule::HeartCondition,
            25,
            "An existing heart condition",
        ),
    ];

    for (present, rule, delta, label) in conditions {
        if present {
            components.push(ScoreComponent {
                rule,
                delta,
                notes: format!("{label} recorded in your profile raises heart risk."),
            });
        }
    }

    if let Some(age) = profile.age {
        let delta = if age > SENIOR_AGE {
            10
        } else if age > MIDDLE_AGE {
            5
        } else {
            0
        };

        if delta > 0 {
            components.push(ScoreComponent {
                rule: RiskRule::Age,
                delta,
                notes: format!("Heart risk increases with age ({age})."),
            });
        }
    }

    components
}
