use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use policygen_agent::{
    GenerationOrchestrator, PolicyDraftRequest, Provenance, ProviderClient, Sleeper, TokioSleeper,
};
use policygen_core::{
    ApplicationError, ClientProfile, CoverageRequest, DeterministicUnderwritingRuntime,
    PricingQuote, RiskAssessment, UnderwritingEvaluation, UnderwritingRuntime,
};
use policygen_db::{PolicyId, PolicyStore};

const REFINEMENT_NOTE_PREFIX_CHARS: usize = 30;

#[derive(Clone, Debug, Serialize)]
pub struct CreatedPolicy {
    /// Absent when the store could not create a record.
    pub policy_id: Option<PolicyId>,
    pub risk_assessment: RiskAssessment,
    pub pricing: PricingQuote,
    pub policy_text: String,
    pub provenance: Provenance,
}

#[derive(Clone, Debug, Serialize)]
pub struct RefinedPolicy {
    pub policy_id: Option<PolicyId>,
    pub policy_text: String,
    pub provenance: Provenance,
    /// Stored version number, when the new text was persisted.
    pub version: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PolicyAnswer {
    pub answer: String,
    pub provenance: Provenance,
}

/// Wires underwriting, generation and persistence into the user-facing flows.
/// Store failures are logged and never change the computed result.
pub struct PolicyPipeline<P, S = TokioSleeper> {
    underwriting: Box<dyn UnderwritingRuntime>,
    generator: GenerationOrchestrator<P, S>,
    store: Arc<dyn PolicyStore>,
}

impl<P: ProviderClient, S: Sleeper> PolicyPipeline<P, S> {
    pub fn new(generator: GenerationOrchestrator<P, S>, store: Arc<dyn PolicyStore>) -> Self {
        Self::with_underwriting(
            Box::new(DeterministicUnderwritingRuntime::default()),
            generator,
            store,
        )
    }

    pub fn with_underwriting(
        underwriting: Box<dyn UnderwritingRuntime>,
        generator: GenerationOrchestrator<P, S>,
        store: Arc<dyn PolicyStore>,
    ) -> Self {
        Self { underwriting, generator, store }
    }

    pub fn generator(&self) -> &GenerationOrchestrator<P, S> {
        &self.generator
    }

    pub fn store(&self) -> &Arc<dyn PolicyStore> {
        &self.store
    }

    pub async fn create_policy(
        &self,
        correlation_id: &str,
        client_details: &Value,
        insurance_details: &Value,
    ) -> CreatedPolicy {
        let span = tracing::info_span!("create_policy", correlation_id);
        self.create_policy_inner(client_details, insurance_details, correlation_id)
            .instrument(span)
            .await
    }

    async fn create_policy_inner(
        &self,
        client_details: &Value,
        insurance_details: &Value,
        correlation_id: &str,
    ) -> CreatedPolicy {
        let client = ClientProfile::from_json(client_details);
        let coverage = CoverageRequest::from_json(insurance_details);
        let evaluation = self.underwriting.evaluate(&client, &coverage);

        tracing::info!(
            event_name = "pipeline.policy.underwritten",
            correlation_id,
            risk_score = %evaluation.risk_assessment.score,
            monthly_premium = %evaluation.pricing.monthly_premium,
            "risk assessed and premium priced"
        );

        let outcome = self
            .generator
            .generate_policy(&PolicyDraftRequest {
                client: &client,
                coverage: &coverage,
                risk_assessment: &evaluation.risk_assessment,
                pricing: &evaluation.pricing,
            })
            .await;
        let provenance = outcome.provenance();
        let policy_text = outcome.into_text();

        let policy_id = self
            .persist_created(&client, &coverage, &evaluation, &policy_text, correlation_id)
            .await;

        tracing::info!(
            event_name = "pipeline.policy.created",
            correlation_id,
            policy_id = policy_id.as_ref().map(|id| id.0.as_str()).unwrap_or("unpersisted"),
            provenance = ?provenance,
            "policy created"
        );

        CreatedPolicy {
            policy_id,
            risk_assessment: evaluation.risk_assessment,
            pricing: evaluation.pricing,
            policy_text,
            provenance,
        }
    }

    async fn persist_created(
        &self,
        client: &ClientProfile,
        coverage: &CoverageRequest,
        evaluation: &UnderwritingEvaluation,
        policy_text: &str,
        correlation_id: &str,
    ) -> Option<PolicyId> {
        let record = match self.store.create_policy(client, coverage).await {
            Ok(record) => record,
            Err(error) => {
                log_store_failure("create_policy", None, correlation_id, &error);
                return None;
            }
        };
        let policy_id = record.id;

        let assessment = &evaluation.risk_assessment;
        if let Err(error) = self.store.save_risk_assessment(&policy_id, assessment).await {
            log_store_failure("save_risk_assessment", Some(&policy_id), correlation_id, &error);
        }
        if let Err(error) = self.store.save_pricing(&policy_id, &evaluation.pricing).await {
            log_store_failure("save_pricing", Some(&policy_id), correlation_id, &error);
        }
        if let Err(error) =
            self.store.save_policy_version(&policy_id, policy_text, "Initial version").await
        {
            log_store_failure("save_policy_version", Some(&policy_id), correlation_id, &error);
        }

        Some(policy_id)
    }

    /// Applies `instruction` to `current_text`, or to the latest stored version
    /// when no text is supplied.
    pub async fn refine_policy(
        &self,
        correlation_id: &str,
        policy_id: Option<&PolicyId>,
        instruction: &str,
        current_text: Option<&str>,
    ) -> Result<RefinedPolicy, ApplicationError> {
        let span = tracing::info_span!("refine_policy", correlation_id);
        self.refine_policy_inner(policy_id, instruction, current_text, correlation_id)
            .instrument(span)
            .await
    }

    async fn refine_policy_inner(
        &self,
        policy_id: Option<&PolicyId>,
        instruction: &str,
        current_text: Option<&str>,
        correlation_id: &str,
    ) -> Result<RefinedPolicy, ApplicationError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            let message = "refinement instruction is empty".to_string();
            return Err(ApplicationError::Validation(message));
        }

        let current_text = match current_text.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => text.to_string(),
            None => self.latest_policy_text(policy_id).await?,
        };

        let outcome = self.generator.refine_policy(&current_text, instruction).await;
        let provenance = outcome.provenance();
        let policy_text = outcome.into_text();

        let mut version = None;
        if let Some(policy_id) = policy_id {
            if let Err(error) = self.store.log_prompt(policy_id, instruction).await {
                log_store_failure("log_prompt", Some(policy_id), correlation_id, &error);
            }
            // Degraded text is a failure notice, not a policy revision.
            if provenance == Provenance::Live {
                version = self
                    .save_refinement(policy_id, &policy_text, instruction, correlation_id)
                    .await;
            }
        }

        tracing::info!(
            event_name = "pipeline.policy.refined",
            correlation_id,
            provenance = ?provenance,
            version,
            "policy refinement completed"
        );

        Ok(RefinedPolicy { policy_id: policy_id.cloned(), policy_text, provenance, version })
    }

    async fn save_refinement(
        &self,
        policy_id: &PolicyId,
        policy_text: &str,
        instruction: &str,
        correlation_id: &str,
    ) -> Option<u32> {
        let note = refinement_note(instruction);
        match self.store.save_policy_version(policy_id, policy_text, &note).await {
            Ok(saved) => Some(saved.version),
            Err(error) => {
                log_store_failure("save_policy_version", Some(policy_id), correlation_id, &error);
                None
            }
        }
    }

    async fn latest_policy_text(
        &self,
        policy_id: Option<&PolicyId>,
    ) -> Result<String, ApplicationError> {
        let Some(policy_id) = policy_id else {
            return Err(ApplicationError::Validation(
                "current policy text or a policy id is required".to_string(),
            ));
        };

        let stored = self
            .store
            .find_policy(policy_id)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        stored
            .as_ref()
            .and_then(|stored| stored.latest_version())
            .map(|version| version.policy_text.clone())
            .ok_or_else(|| {
                ApplicationError::Validation(format!("no stored policy text for {policy_id}"))
            })
    }

    pub async fn answer_question(
        &self,
        correlation_id: &str,
        policy_context: &str,
        question: &str,
    ) -> Result<PolicyAnswer, ApplicationError> {
        let policy_context = policy_context.trim();
        let question = question.trim();
        if policy_context.is_empty() || question.is_empty() {
            return Err(ApplicationError::Validation(
                "missing question or policy context".to_string(),
            ));
        }

        let span = tracing::info_span!("answer_question", correlation_id);
        let outcome =
            self.generator.answer_question(policy_context, question).instrument(span).await;
        tracing::info!(
            event_name = "pipeline.question.answered",
            correlation_id,
            provenance = ?outcome.provenance(),
            "policy question answered"
        );
        Ok(PolicyAnswer { provenance: outcome.provenance(), answer: outcome.into_text() })
    }
}

fn refinement_note(instruction: &str) -> String {
    let prefix = instruction.chars().take(REFINEMENT_NOTE_PREFIX_CHARS).collect::<String>();
    format!("Refinement: {prefix}...")
}

pub fn new_correlation_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

fn log_store_failure(
    operation: &'static str,
    policy_id: Option<&PolicyId>,
    correlation_id: &str,
    error: &policygen_db::StoreError,
) {
    tracing::warn!(
        event_name = "pipeline.persistence.failed",
        correlation_id,
        operation,
        policy_id = policy_id.map(|id| id.0.as_str()).unwrap_or("unassigned"),
        error = %error,
        "persistence failed; continuing with computed result"
    );
}
