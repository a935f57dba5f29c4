use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use policygen_core::{ClientProfile, CoverageRequest, PricingQuote, RiskAssessment};

use super::{PolicyStore, StoreError};
use crate::records::{PolicyId, PolicyRecord, PolicyVersion, PromptLogEntry, StoredPolicy};

#[derive(Default)]
pub struct InMemoryPolicyStore {
    policies: RwLock<HashMap<String, StoredPolicy>>,
}

impl InMemoryPolicyStore {
    pub async fn len(&self) -> usize {
        self.policies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.policies.read().await.is_empty()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn create_policy(
        &self,
        client: &ClientProfile,
        coverage: &CoverageRequest,
    ) -> Result<PolicyRecord, StoreError> {
        let record = PolicyRecord {
            id: PolicyId(Uuid::new_v4().to_string()),
            client: client.clone(),
            coverage: coverage.clone(),
            created_at: Utc::now(),
        };

        let mut policies = self.policies.write().await;
        policies.insert(record.id.0.clone(), StoredPolicy::new(record.clone()));
        Ok(record)
    }

    async fn save_risk_assessment(
        &self,
        policy_id: &PolicyId,
        assessment: &RiskAssessment,
    ) -> Result<(), StoreError> {
        let mut policies = self.policies.write().await;
        let stored = policies
            .get_mut(&policy_id.0)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
        stored.risk_assessment = Some(assessment.clone());
        Ok(())
    }

    async fn save_pricing(
        &self,
        policy_id: &PolicyId,
        quote: &PricingQuote,
    ) -> Result<(), StoreError> {
        let mut policies = self.policies.write().await;
        let stored = policies
            .get_mut(&policy_id.0)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
        stored.pricing = Some(quote.clone());
        Ok(())
    }

    async fn save_policy_version(
        &self,
        policy_id: &PolicyId,
        policy_text: &str,
        version_note: &str,
    ) -> Result<PolicyVersion, StoreError> {
        let mut policies = self.policies.write().await;
        let stored = policies
            .get_mut(&policy_id.0)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;

        let version = u32::try_from(stored.versions.len() + 1).map_err(|_| {
            StoreError::Unavailable(format!("version limit reached for policy {}", policy_id.0))
        })?;
        let version = PolicyVersion {
            policy_id: policy_id.clone(),
            version,
            policy_text: policy_text.to_string(),
            version_note: version_note.to_string(),
            created_at: Utc::now(),
        };
        stored.versions.push(version.clone());
        Ok(version)
    }

    async fn log_prompt(&self, policy_id: &PolicyId, prompt_text: &str) -> Result<(), StoreError> {
        let mut policies = self.policies.write().await;
        let stored = policies
            .get_mut(&policy_id.0)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
        stored.prompts.push(PromptLogEntry {
            policy_id: policy_id.clone(),
            prompt_text: prompt_text.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_policy(&self, policy_id: &PolicyId) -> Result<Option<StoredPolicy>, StoreError> {
        let policies = self.policies.read().await;
        Ok(policies.get(&policy_id.0).cloned())
    }
}
