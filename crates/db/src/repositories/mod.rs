use async_trait::async_trait;
use thiserror::Error;

use policygen_core::{ClientProfile, CoverageRequest, PricingQuote, RiskAssessment};

use crate::records::{PolicyId, PolicyRecord, PolicyVersion, StoredPolicy};

pub mod memory;

pub use memory::InMemoryPolicyStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("policy not found: {0}")]
    PolicyNotFound(PolicyId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence sink for generated policies.
///
/// Callers treat every method as best-effort: a failure is logged and the
/// already computed result is still returned to the user.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn create_policy(
        &self,
        client: &ClientProfile,
        coverage: &CoverageRequest,
    ) -> Result<PolicyRecord, StoreError>;

    async fn save_risk_assessment(
        &self,
        policy_id: &PolicyId,
        assessment: &RiskAssessment,
    ) -> Result<(), StoreError>;

    async fn save_pricing(&self, policy_id: &PolicyId, quote: &PricingQuote)
        -> Result<(), StoreError>;

    async fn save_policy_version(
        &self,
        policy_id: &PolicyId,
        policy_text: &str,
        version_note: &str,
    ) -> Result<PolicyVersion, StoreError>;

    async fn log_prompt(&self, policy_id: &PolicyId, prompt_text: &str) -> Result<(), StoreError>;

    async fn find_policy(&self, policy_id: &PolicyId) -> Result<Option<StoredPolicy>, StoreError>;
}
