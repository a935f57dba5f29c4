use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Named monthly contributions behind a quote. Values are un-rounded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_premium: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub processing_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rider_costs: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_adjustment: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_premium: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub yearly_premium: Decimal,
    pub breakdown: PricingBreakdown,
    pub explanation: String,
}
