use serde_json::Value;

use policygen_core::domain::coverage::{
    default_coverage_amount, parse_amount, DEFAULT_INSURANCE_TYPE,
};
use policygen_core::underwriting::pricing::price_for_label;

use super::{string_field, CommandResult};

const DEFAULT_RISK_LABEL: &str = "Medium";

/// Prices `{ risk_score, coverage_amount, type }`, defaulting each field.
pub fn run(payload: &Value) -> CommandResult {
    let risk_label =
        non_empty(string_field(payload, &["risk_score"])).unwrap_or(DEFAULT_RISK_LABEL);
    let coverage_amount = payload
        .get("coverage_amount")
        .and_then(parse_amount)
        .unwrap_or_else(default_coverage_amount);
    let insurance_type = non_empty(string_field(payload, &["type", "insurance_type"]))
        .unwrap_or(DEFAULT_INSURANCE_TYPE);

    let quote = price_for_label(risk_label, coverage_amount, insurance_type);
    let message = format!(
        "monthly premium {} / yearly premium {}",
        quote.monthly_premium, quote.yearly_premium
    );
    CommandResult::with_result("price", message, &quote)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
