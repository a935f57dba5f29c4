pub mod pricing;
pub mod risk;

use serde::{Deserialize, Serialize};

use crate::domain::{
    coverage::CoverageRequest, pricing::PricingQuote, profile::ClientProfile, risk::RiskAssessment,
};

use self::{
    pricing::{DeterministicPricingEngine, PricingEngine},
    risk::{DeterministicRiskEngine, RiskEngine},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingEvaluation {
    pub risk_assessment: RiskAssessment,
    pub pricing: PricingQuote,
}

/// Runs the risk engine and feeds its score into the pricing engine.
pub trait UnderwritingRuntime: Send + Sync {
    fn evaluate(
        &self,
        profile: &ClientProfile,
        coverage: &CoverageRequest,
    ) -> UnderwritingEvaluation;
}

pub struct DeterministicUnderwritingRuntime<R, P> {
    risk_engine: R,
    pricing_engine: P,
}

impl<R, P> DeterministicUnderwritingRuntime<R, P> {
    pub fn new(risk_engine: R, pricing_engine: P) -> Self {
        Self { risk_engine, pricing_engine }
    }
}

impl Default
    for DeterministicUnderwritingRuntime<DeterministicRiskEngine, DeterministicPricingEngine>
{
    fn default() -> Self {
        Self::new(DeterministicRiskEngine, DeterministicPricingEngine)
    }
}

impl<R, P> UnderwritingRuntime for DeterministicUnderwritingRuntime<R, P>
where
    R: RiskEngine,
    P: PricingEngine,
{
    fn evaluate(
        &self,
        profile: &ClientProfile,
        coverage: &CoverageRequest,
    ) -> UnderwritingEvaluation {
        let risk_assessment = self.risk_engine.assess(profile);
        let pricing = self.pricing_engine.price(
            risk_assessment.score,
            coverage.coverage_amount,
            &coverage.insurance_type,
        );

        UnderwritingEvaluation { risk_assessment, pricing }
    }
}
