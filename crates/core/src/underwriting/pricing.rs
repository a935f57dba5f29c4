use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::pricing::{PricingBreakdown, PricingQuote};
use crate::domain::risk::RiskLevel;

const COVERAGE_UNIT: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const DEFAULT_BASE_RATE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const NEUTRAL_MULTIPLIER: Decimal = Decimal::from_parts(10, 0, 0, false, 1);
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
/// Yearly payment earns a 5% discount.
const ANNUAL_PAYMENT_FACTOR: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

pub const PROCESSING_FEE: Decimal = Decimal::from_parts(1_000, 0, 0, false, 2);
pub const RIDER_COST: Decimal = Decimal::from_parts(2_500, 0, 0, false, 2);

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        risk_score: RiskLevel,
        coverage_amount: Decimal,
        insurance_type: &str,
    ) -> PricingQuote;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        risk_score: RiskLevel,
        coverage_amount: Decimal,
        insurance_type: &str,
    ) -> PricingQuote {
        price_coverage(risk_score, coverage_amount, insurance_type)
    }
}

/// Monthly base rate per 1000 of coverage. Unknown types get the default rate.
pub fn base_rate(insurance_type: &str) -> Decimal {
    match insurance_type.trim().to_ascii_lowercase().as_str() {
        "life" => Decimal::new(10, 2),
        "health" => Decimal::new(50, 2),
        "auto" => Decimal::new(30, 2),
        "property" => Decimal::new(20, 2),
        _ => DEFAULT_BASE_RATE,
    }
}

/// `None` stands for a risk label that did not parse; it prices neutrally.
pub fn risk_multiplier(risk_score: Option<RiskLevel>) -> Decimal {
    match risk_score {
        Some(RiskLevel::Low) => Decimal::new(8, 1),
        Some(RiskLevel::Medium) => NEUTRAL_MULTIPLIER,
        Some(RiskLevel::High) => Decimal::new(15, 1),
        None => NEUTRAL_MULTIPLIER,
    }
}

pub fn price_coverage(
    risk_score: RiskLevel,
    coverage_amount: Decimal,
    insurance_type: &str,
) -> PricingQuote {
    build_quote(risk_score.as_str(), Some(risk_score), coverage_amount, insurance_type)
}

/// Prices from a free-form risk label, as received from callers that have not
/// run the risk engine themselves.
pub fn price_for_label(
    risk_label: &str,
    coverage_amount: Decimal,
    insurance_type: &str,
) -> PricingQuote {
    let parsed = RiskLevel::parse(risk_label);
    let label = parsed.map(|level| level.as_str()).unwrap_or(risk_label);
    build_quote(label, parsed, coverage_amount, insurance_type)
}

fn build_quote(
    risk_label: &str,
    risk_score: Option<RiskLevel>,
    coverage_amount: Decimal,
    insurance_type: &str,
) -> PricingQuote {
    let coverage_amount = coverage_amount.max(Decimal::ZERO);
    let multiplier = risk_multiplier(risk_score);

    let monthly_base = coverage_amount / COVERAGE_UNIT * base_rate(insurance_type) * multiplier;
    let monthly_total = monthly_base + PROCESSING_FEE + RIDER_COST;
    let yearly_total = monthly_total * MONTHS_PER_YEAR * ANNUAL_PAYMENT_FACTOR;

    let monthly_premium = round_money(monthly_total);
    let yearly_premium = round_money(yearly_total);

    let explanation = format!(
        "Calculated pricing for {insurance_type} insurance with a {risk_label} risk profile. \
         Base rate adjusted by {multiplier}x for risk. Monthly premium: ${monthly_premium}."
    );

    PricingQuote {
        monthly_premium,
        yearly_premium,
        breakdown: PricingBreakdown {
            base_premium: monthly_base,
            processing_fee: PROCESSING_FEE,
            rider_costs: RIDER_COST,
            risk_adjustment: (multiplier - NEUTRAL_MULTIPLIER) * monthly_base,
        },
        explanation,
    }
}

/// Rounds half away from zero and pins the scale to two places.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        base_rate, price_coverage, price_for_label, round_money, DeterministicPricingEngine,
        PricingEngine, PROCESSING_FEE, RIDER_COST,
    };
    use crate::domain::risk::RiskLevel;

    fn amount(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn medium_risk_life_cover_matches_reference_quote() {
        let quote = DeterministicPricingEngine.price(RiskLevel::Medium, amount(100_000), "life");

        assert_eq!(quote.breakdown.base_premium, amount(10));
        assert_eq!(quote.monthly_premium, amount(45));
        assert_eq!(quote.yearly_premium, amount(513));
        assert_eq!(quote.breakdown.risk_adjustment, Decimal::ZERO);
        assert_eq!(
            quote.explanation,
            "Calculated pricing for life insurance with a Medium risk profile. \
             Base rate adjusted by 1.0x for risk. Monthly premium: $45.00."
        );
    }

    #[test]
    fn low_risk_reports_a_negative_adjustment() {
        let quote = price_coverage(RiskLevel::Low, amount(100_000), "health");

        // 100 * 0.50 * 0.8
        assert_eq!(quote.breakdown.base_premium, amount(40));
        assert_eq!(quote.breakdown.risk_adjustment, amount(-8));
        assert_eq!(quote.monthly_premium, amount(75));
        assert!(quote.explanation.contains("0.8x"));
    }

    #[test]
    fn insurance_type_lookup_is_case_insensitive_with_default() {
        assert_eq!(base_rate("LIFE"), Decimal::new(10, 2));
        assert_eq!(base_rate(" Property "), Decimal::new(20, 2));
        assert_eq!(base_rate("pet"), Decimal::new(30, 2));
    }

    #[test]
    fn unrecognized_risk_label_prices_neutrally() {
        let unknown = price_for_label("Severe", amount(50_000), "auto");
        let medium = price_for_label("medium", amount(50_000), "auto");

        assert_eq!(unknown.monthly_premium, medium.monthly_premium);
        assert!(unknown.explanation.contains("a Severe risk profile"));
        assert!(medium.explanation.contains("a Medium risk profile"));
    }

    #[test]
    fn premiums_never_drop_below_fixed_fees() {
        let floor = PROCESSING_FEE + RIDER_COST;
        for coverage in [amount(0), amount(-5_000), amount(1), amount(2_000_000)] {
            for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
                let quote = price_coverage(level, coverage, "life");
                assert!(quote.monthly_premium >= floor);
                assert!(quote.yearly_premium >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn premium_is_monotone_in_coverage_and_risk() {
        for insurance_type in ["life", "health", "auto", "property", "other"] {
            let mut previous = Decimal::ZERO;
            for coverage in (0..=20).map(|step| amount(step * 25_000)) {
                let quote = price_coverage(RiskLevel::Medium, coverage, insurance_type);
                assert!(quote.monthly_premium >= previous);
                previous = quote.monthly_premium;
            }

            let low = price_coverage(RiskLevel::Low, amount(80_000), insurance_type);
            let medium = price_coverage(RiskLevel::Medium, amount(80_000), insurance_type);
            let high = price_coverage(RiskLevel::High, amount(80_000), insurance_type);
            assert!(low.monthly_premium <= medium.monthly_premium);
            assert!(medium.monthly_premium <= high.monthly_premium);
        }
    }

    #[test]
    fn yearly_premium_tracks_monthly_with_annual_discount() {
        let tolerance = Decimal::new(1, 1);
        for coverage in [amount(12_345), amount(99_999), amount(333_333)] {
            for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
                let quote = price_coverage(level, coverage, "health");
                let expected = quote.monthly_premium * amount(12) * Decimal::new(95, 2);
                assert!((quote.yearly_premium - expected).abs() <= tolerance);
            }
        }
    }

    #[test]
    fn money_rounding_is_half_away_from_zero_with_two_places() {
        assert_eq!(round_money(Decimal::new(12_345, 3)).to_string(), "12.35");
        assert_eq!(round_money(amount(45)).to_string(), "45.00");
    }
}
