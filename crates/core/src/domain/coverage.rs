use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_INSURANCE_TYPE: &str = "life";

pub fn default_coverage_amount() -> Decimal {
    Decimal::new(100_000, 0)
}

/// The coverage a client asks to be quoted for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRequest {
    #[serde(rename = "type")]
    pub insurance_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub coverage_amount: Decimal,
}

impl Default for CoverageRequest {
    fn default() -> Self {
        Self {
            insurance_type: DEFAULT_INSURANCE_TYPE.to_string(),
            coverage_amount: default_coverage_amount(),
        }
    }
}

impl CoverageRequest {
    pub fn new(insurance_type: impl Into<String>, coverage_amount: Decimal) -> Self {
        Self { insurance_type: insurance_type.into(), coverage_amount }
    }

    /// Reads `{type, coverage_amount}` from an untyped payload, defaulting
    /// anything missing or malformed.
    pub fn from_json(payload: &Value) -> Self {
        let defaults = Self::default();

        let insurance_type = payload
            .get("type")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.insurance_type);

        let coverage_amount = payload
            .get("coverage_amount")
            .and_then(parse_amount)
            .unwrap_or(defaults.coverage_amount);

        Self { insurance_type, coverage_amount }
    }
}

/// Converts a loosely typed JSON number or numeric string into a decimal amount.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Some(Decimal::from(integer));
            }
            number.as_f64().filter(|amount| amount.is_finite()).and_then(|amount| {
                Decimal::try_from(amount).ok()
            })
        }
        Value::String(raw) => raw.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}
