use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use policygen_core::{ClientProfile, CoverageRequest, PricingQuote, RiskAssessment};

/// Opaque policy identifier. Store-assigned on creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub String);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub client: ClientProfile,
    pub coverage: CoverageRequest,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub policy_id: PolicyId,
    /// 1-based, increasing per policy.
    pub version: u32,
    pub policy_text: String,
    pub version_note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub policy_id: PolicyId,
    pub prompt_text: String,
    pub created_at: DateTime<Utc>,
}

/// Everything persisted for one policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredPolicy {
    pub record: PolicyRecord,
    pub risk_assessment: Option<RiskAssessment>,
    pub pricing: Option<PricingQuote>,
    pub versions: Vec<PolicyVersion>,
    pub prompts: Vec<PromptLogEntry>,
}

impl StoredPolicy {
    pub fn new(record: PolicyRecord) -> Self {
        Self {
            record,
            risk_assessment: None,
            pricing: None,
            versions: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn latest_version(&self) -> Option<&PolicyVersion> {
        self.versions.last()
    }
}
