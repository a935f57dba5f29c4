use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of the score values categorised as `Low`.
pub const LOW_RISK_CEILING: f64 = 0.4;
/// Upper bound (exclusive) of the score values categorised as `Medium`.
pub const MEDIUM_RISK_CEILING: f64 = 0.7;

/// Categorical level shared by the overall risk score and individual factor impacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Maps a score value onto its category. The value is clamped to `[0, 1]`
    /// first, so out-of-range inputs land on the nearest bound.
    pub fn from_score_value(score_value: f64) -> Self {
        let clamped = clamp_score_value(score_value);
        if clamped < LOW_RISK_CEILING {
            Self::Low
        } else if clamped < MEDIUM_RISK_CEILING {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn clamp_score_value(score_value: f64) -> f64 {
    if score_value.is_nan() {
        return 0.0;
    }
    score_value.clamp(0.0, 1.0)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub impact: RiskLevel,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: RiskLevel,
    pub score_value: f64,
    pub factors: Vec<RiskFactor>,
    pub explanation: String,
}

impl RiskAssessment {
    pub fn factor(&self, name: &str) -> Option<&RiskFactor> {
        self.factors.iter().find(|factor| factor.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_score_value, RiskLevel};

    #[test]
    fn score_thresholds_are_half_open() {
        assert_eq!(RiskLevel::from_score_value(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score_value(0.39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score_value(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score_value(0.69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score_value(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_score_value(1.0), RiskLevel::High);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(clamp_score_value(1.4), 1.0);
        assert_eq!(clamp_score_value(-0.2), 0.0);
        assert_eq!(clamp_score_value(f64::NAN), 0.0);
        assert_eq!(RiskLevel::from_score_value(3.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score_value(-3.0), RiskLevel::Low);
    }

    #[test]
    fn levels_are_ordered_and_parse_case_insensitively() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::parse(" HIGH "), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("severe"), None);
    }

    #[test]
    fn levels_serialize_with_capitalized_labels() {
        let value = serde_json::to_value(RiskLevel::Medium).expect("serialize level");
        assert_eq!(value, "Medium");
    }
}
