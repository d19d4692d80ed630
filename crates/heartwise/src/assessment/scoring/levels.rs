use serde::{Deserialize, Serialize};

const HIGH_RISK_FLOOR: u32 = 70;
const MEDIUM_RISK_FLOOR: u32 = 40;
const LOW_RISK_FLOOR: u32 = 20;

/// Qualitative bucket for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Very Low Risk")]
    VeryLow,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    /// Scores are unbounded; everything at or above the high floor is high risk.
    pub const fn from_score(score: u32) -> Self {
        if score >= HIGH_RISK_FLOOR {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_FLOOR {
            RiskLevel::Medium
        } else if score >= LOW_RISK_FLOOR {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        }
    }

    /// Presentation tag paired with this level.
    pub const fn class(self) -> RiskClass {
        match self {
            RiskLevel::VeryLow => RiskClass::Info,
            RiskLevel::Low => RiskClass::Low,
            RiskLevel::Medium => RiskClass::Medium,
            RiskLevel::High => RiskClass::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low Risk",
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

/// CSS-style tag consumed by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    #[serde(rename = "risk-info")]
    Info,
    #[serde(rename = "risk-low")]
    Low,
    #[serde(rename = "risk-medium")]
    Medium,
    #[serde(rename = "risk-high")]
    High,
}

impl RiskClass {
    pub const fn from_score(score: u32) -> Self {
        RiskLevel::from_score(score).class()
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskClass::Info => "risk-info",
            RiskClass::Low => "risk-low",
            RiskClass::Medium => "risk-medium",
            RiskClass::High => "risk-high",
        }
    }
}

pub fn classify(score: u32) -> (RiskLevel, RiskClass) {
    let level = RiskLevel::from_score(score);
    (level, level.class())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_map_to_expected_buckets() {
        let cases = [
            (0, RiskLevel::VeryLow, RiskClass::Info),
            (19, RiskLevel::VeryLow, RiskClass::Info),
            (20, RiskLevel::Low, RiskClass::Low),
            (39, RiskLevel::Low, RiskClass::Low),
            (40, RiskLevel::Medium, RiskClass::Medium),
            (69, RiskLevel::Medium, RiskClass::Medium),
            (70, RiskLevel::High, RiskClass::High),
            (250, RiskLevel::High, RiskClass::High),
        ];

        for (score, level, class) in cases {
            assert_eq!(classify(score), (level, class), "score {score}");
        }
    }

    #[test]
    fn class_and_level_move_in_lockstep() {
        let mut previous = classify(0);
        for score in 0..=200 {
            let current = classify(score);
            assert_eq!(RiskClass::from_score(score), current.1);
            assert_eq!(
                current.0 != previous.0,
                current.1 != previous.1,
                "level and class must change together at score {score}"
            );
            previous = current;
        }
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let level = serde_json::to_value(RiskLevel::Medium).expect("serialize level");
        assert_eq!(level, serde_json::json!("Medium Risk"));
        let class = serde_json::to_value(RiskClass::Info).expect("serialize class");
        assert_eq!(class, serde_json::json!(RiskClass::Info.label()));
        let parsed: RiskLevel = serde_json::from_value(serde_json::json!("High Risk"))
            .expect("deserialize level");
        assert_eq!(parsed, RiskLevel::High);
    }
}
