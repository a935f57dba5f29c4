use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_INCOME: f64 = 50_000.0;

/// Lifestyle category reported by the client. Only the exact `high_risk` label
/// is high risk; anything else is scored like `standard`, but the raw label is
/// kept for prompt rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Lifestyle {
    #[default]
    Standard,
    HighRisk,
    Other(String),
}

impl Lifestyle {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed {
            "" | "standard" => Self::Standard,
            "high_risk" => Self::HighRisk,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard => "standard",
            Self::HighRisk => "high_risk",
            Self::Other(label) => label,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        matches!(self, Self::HighRisk)
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Lifestyle {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Lifestyle> for String {
    fn from(value: Lifestyle) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    pub age: u32,
    pub income: f64,
    pub medical_history: bool,
    pub lifestyle: Lifestyle,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            income: DEFAULT_INCOME,
            medical_history: false,
            lifestyle: Lifestyle::Standard,
        }
    }
}

impl ClientProfile {
    /// Builds a profile from an untyped client payload. Missing or malformed
    /// fields fall back to the documented defaults; this never fails.
    pub fn from_json(payload: &Value) -> Self {
        let defaults = Self::default();

        Self {
            age: payload.get("age").and_then(parse_age).unwrap_or(defaults.age),
            income: payload.get("income").and_then(parse_income).unwrap_or(defaults.income),
            medical_history: payload
                .get("medical_history")
                .and_then(parse_flag)
                .unwrap_or(defaults.medical_history),
            lifestyle: payload
                .get("lifestyle")
                .and_then(Value::as_str)
                .map(Lifestyle::parse)
                .unwrap_or(defaults.lifestyle),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

fn parse_age(value: &Value) -> Option<u32> {
    if let Some(age) = value.as_u64() {
        return u32::try_from(age).ok();
    }

    // Fractional ages are malformed rather than truncated.
    numeric(value)
        .filter(|age| *age >= 0.0 && *age <= f64::from(u32::MAX) && age.fract() == 0.0)
        .map(|age| age as u32)
}

fn parse_income(value: &Value) -> Option<f64> {
    numeric(value).filter(|income| *income >= 0.0)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().and_then(|n| match n {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClientProfile, Lifestyle, DEFAULT_AGE, DEFAULT_INCOME};

    #[test]
    fn empty_payload_uses_documented_defaults() {
        let profile = ClientProfile::from_json(&json!({}));

        assert_eq!(profile, ClientProfile::default());
        assert_eq!(profile.age, DEFAULT_AGE);
        assert_eq!(profile.income, DEFAULT_INCOME);
        assert!(!profile.medical_history);
        assert_eq!(profile.lifestyle, Lifestyle::Standard);
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let profile = ClientProfile::from_json(&json!({
            "age": "not-a-number",
            "income": -100,
            "medical_history": "sometimes",
            "lifestyle": 42,
        }));

        assert_eq!(profile, ClientProfile::default());
    }

    #[test]
    fn loosely_typed_values_are_accepted() {
        let profile = ClientProfile::from_json(&json!({
            "age": "64",
            "income": 18000.5,
            "medical_history": 1,
            "lifestyle": " high_risk ",
        }));

        assert_eq!(profile.age, 64);
        assert_eq!(profile.income, 18000.5);
        assert!(profile.medical_history);
        assert!(profile.lifestyle.is_high_risk());
    }

    #[test]
    fn lifestyle_label_must_match_exactly() {
        let shouting = ClientProfile::from_json(&json!({ "lifestyle": "HIGH_RISK" }));
        let mixed = ClientProfile::from_json(&json!({ "lifestyle": " High_Risk " }));

        assert_eq!(shouting.lifestyle, Lifestyle::Other("HIGH_RISK".to_string()));
        assert!(!shouting.lifestyle.is_high_risk());
        assert!(!mixed.lifestyle.is_high_risk());
    }

    #[test]
    fn fractional_age_is_treated_as_malformed() {
        let profile = ClientProfile::from_json(&json!({ "age": 60.5 }));
        assert_eq!(profile.age, DEFAULT_AGE);

        let whole = ClientProfile::from_json(&json!({ "age": 61.0 }));
        assert_eq!(whole.age, 61);
    }

    #[test]
    fn unknown_lifestyle_keeps_label_but_is_not_high_risk() {
        let profile = ClientProfile::from_json(&json!({ "lifestyle": "active" }));

        assert_eq!(profile.lifestyle, Lifestyle::Other("active".to_string()));
        assert!(!profile.lifestyle.is_high_risk());
        assert_eq!(profile.lifestyle.to_string(), "active");
    }

    #[test]
    fn profile_serializes_lifestyle_as_plain_string() {
        let profile = ClientProfile { lifestyle: Lifestyle::HighRisk, ..ClientProfile::default() };
        let value = serde_json::to_value(&profile).expect("serialize profile");

        assert_eq!(value["lifestyle"], "high_risk");
        assert_eq!(value["age"], 30);
    }
}
