//! Deterministic underwriting core: client profiles, risk scoring, pricing,
//! and the configuration shared by the rest of the workspace.
//!
//! Nothing in this crate performs I/O beyond loading configuration. The risk
//! and pricing engines are total functions; malformed client input is
//! defaulted when the profile is built, not inside the engines.

pub mod config;
pub mod domain;
pub mod errors;
pub mod underwriting;

pub use domain::coverage::CoverageRequest;
pub use domain::pricing::{PricingBreakdown, PricingQuote};
pub use domain::profile::{ClientProfile, Lifestyle};
pub use domain::risk::{RiskAssessment, RiskFactor, RiskLevel};
pub use errors::{ApplicationError, InterfaceError};
pub use underwriting::{
    pricing::{DeterministicPricingEngine, PricingEngine},
    risk::{DeterministicRiskEngine, RiskEngine},
    DeterministicUnderwritingRuntime, UnderwritingEvaluation, UnderwritingRuntime,
};
