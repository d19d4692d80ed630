use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an account as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned identifier of a saved assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in account resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
}

/// Explicit per-request context. Every history operation is scoped by the user it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: AuthenticatedUser,
}

impl Session {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

/// Yes/no radio answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub const fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Answer::Yes),
            "no" => Some(Answer::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ActivityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietQuality {
    Poor,
    Average,
    Good,
    Excellent,
}

impl DietQuality {
    pub const fn label(self) -> &'static str {
        match self {
            DietQuality::Poor => "poor",
            DietQuality::Average => "average",
            DietQuality::Good => "good",
            DietQuality::Excellent => "excellent",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "poor" => Some(DietQuality::Poor),
            "average" => Some(DietQuality::Average),
            "good" => Some(DietQuality::Good),
            "excellent" => Some(DietQuality::Excellent),
            _ => None,
        }
    }
}

/// How often sweets are eaten. `Never` and `Rarely` score the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweetConsumption {
    #[default]
    Never,
    #[serde(alias = "rare")]
    Rarely,
    Sometimes,
    Often,
    VeryOften,
}

impl SweetConsumption {
    pub const fn label(self) -> &'static str {
        match self {
            SweetConsumption::Never => "never",
            SweetConsumption::Rarely => "rarely",
            SweetConsumption::Sometimes => "sometimes",
            SweetConsumption::Often => "often",
            SweetConsumption::VeryOften => "very_often",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "never" => Some(SweetConsumption::Never),
            "rare" | "rarely" => Some(SweetConsumption::Rarely),
            "sometimes" => Some(SweetConsumption::Sometimes),
            "often" => Some(SweetConsumption::Often),
            "very_often" => Some(SweetConsumption::VeryOften),
            _ => None,
        }
    }
}

/// One validated questionnaire. Field names match the stored history document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub chest_pain: Answer,
    pub sleep_hours: u32,
    pub work_hours: u32,
    pub activity_level: ActivityLevel,
    pub diet_quality: DietQuality,
    /// Kilograms. Displayed only, never scored.
    pub current_weight: f64,
    #[serde(rename = "streetFood")]
    pub street_food_frequency: u32,
    pub gym: Answer,
    #[serde(default)]
    pub sweet_consumption: SweetConsumption,
    pub smoke: Answer,
    pub alcohol: Answer,
}

/// Slowly-changing health facts kept on the account, independent of any assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub diabetes: bool,
    #[serde(default)]
    pub kidney_disease: bool,
    #[serde(default)]
    pub family_history: bool,
    #[serde(default)]
    pub heart_condition: bool,
}

/// Partial profile edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diabetes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kidney_disease: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_history: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_condition: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProfileUpdate::default()
    }
}

/// A persisted, timestamped snapshot of one scored assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: EntryId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
    pub risk_score: u32,
    pub risk_level: super::scoring::RiskLevel,
    pub timestamp: DateTime<Utc>,
}
