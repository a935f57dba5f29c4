use serde::Serialize;
use tokio::time::Instant;

use crate::fallback::{FALLBACK_POLICY, QUESTION_UNAVAILABLE, REFINEMENT_UNAVAILABLE};
use crate::llm::{ErrorClass, ProviderClient, ProviderError};
use crate::prompts::{policy_prompt, question_prompt, refinement_prompt, PolicyDraftRequest};
use crate::retry::{CandidateCascade, CascadeDecision, GenerationSettings, Sleeper, TokioSleeper};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationKind {
    Policy,
    Refinement,
    Question,
}

impl GenerationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Refinement => "refinement",
            Self::Question => "question",
        }
    }

    pub fn fallback_text(self) -> &'static str {
        match self {
            Self::Policy => FALLBACK_POLICY,
            Self::Refinement => REFINEMENT_UNAVAILABLE,
            Self::Question => QUESTION_UNAVAILABLE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub model: String,
    pub attempt: u32,
    pub class: ErrorClass,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DegradedReason {
    NoCandidates,
    CandidatesExhausted { failures: Vec<AttemptFailure> },
    BudgetExhausted { failures: Vec<AttemptFailure> },
}

impl DegradedReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCandidates => "no_candidates",
            Self::CandidatesExhausted { .. } => "candidates_exhausted",
            Self::BudgetExhausted { .. } => "budget_exhausted",
        }
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            Self::NoCandidates => &[],
            Self::CandidatesExhausted { failures } | Self::BudgetExhausted { failures } => failures,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Live { text: String, model: String },
    Degraded { text: String, reason: DegradedReason },
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Live { text, .. } | Self::Degraded { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Live { text, .. } | Self::Degraded { text, .. } => text,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Live { .. } => Provenance::Live,
            Self::Degraded { .. } => Provenance::Degraded,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Live { model, .. } => Some(model),
            Self::Degraded { .. } => None,
        }
    }
}

/// Runs prompts through the candidate cascade. Never fails: when no candidate
/// produces text the entry point's deterministic fallback is returned instead.
pub struct GenerationOrchestrator<P, S = TokioSleeper> {
    provider: P,
    settings: GenerationSettings,
    sleeper: S,
}

impl<P: ProviderClient> GenerationOrchestrator<P, TokioSleeper> {
    pub fn new(provider: P, settings: GenerationSettings) -> Self {
        Self::with_sleeper(provider, settings, TokioSleeper)
    }
}

impl<P: ProviderClient, S: Sleeper> GenerationOrchestrator<P, S> {
    pub fn with_sleeper(provider: P, settings: GenerationSettings, sleeper: S) -> Self {
        Self { provider, settings, sleeper }
    }

    /// Builds an orchestrator, asking the provider for candidates when the
    /// configured list is empty. A failed listing leaves the list empty.
    pub async fn discover(provider: P, settings: GenerationSettings, sleeper: S) -> Self {
        if !settings.candidates.is_empty() {
            return Self::with_sleeper(provider, settings, sleeper);
        }

        let candidates = match provider.list_candidate_models().await {
            Ok(models) => {
                tracing::info!(
                    event_name = "agent.generation.candidates_discovered",
                    candidate_count = models.len(),
                    "candidate models discovered from provider"
                );
                models
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.generation.candidate_discovery_failed",
                    error_class = error.class().as_str(),
                    error = %error,
                    "candidate model discovery failed"
                );
                Vec::new()
            }
        };

        Self::with_sleeper(provider, settings.with_candidates(candidates), sleeper)
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub async fn generate_policy(&self, request: &PolicyDraftRequest<'_>) -> GenerationOutcome {
        self.run(GenerationKind::Policy, &policy_prompt(request)).await
    }

    pub async fn refine_policy(
        &self,
        current_policy: &str,
        instruction: &str,
    ) -> GenerationOutcome {
        self.run(GenerationKind::Refinement, &refinement_prompt(current_policy, instruction)).await
    }

    pub async fn answer_question(&self, policy_context: &str, question: &str) -> GenerationOutcome {
        self.run(GenerationKind::Question, &question_prompt(policy_context, question)).await
    }

    pub async fn run(&self, kind: GenerationKind, prompt: &str) -> GenerationOutcome {
        let started = Instant::now();
        let mut cascade = CandidateCascade::new(&self.settings.candidates, self.settings.retry);
        let mut failures = Vec::new();
        let mut backoff_cut_short = false;

        while let Some(step) = cascade.current() {
            if self.budget_spent(started, std::time::Duration::ZERO) {
                return degraded(kind, DegradedReason::BudgetExhausted { failures });
            }

            tracing::debug!(
                event_name = "agent.generation.attempt_started",
                kind = kind.as_str(),
                model = step.model,
                attempt = step.attempt,
                "generation attempt started"
            );

            let error = match self.attempt(step.model, prompt).await {
                Ok(text) => {
                    tracing::info!(
                        event_name = "agent.generation.attempt_succeeded",
                        kind = kind.as_str(),
                        model = step.model,
                        attempt = step.attempt,
                        "generation attempt succeeded"
                    );
                    return GenerationOutcome::Live { text, model: step.model.to_string() };
                }
                Err(error) => error,
            };

            let class = error.class();
            failures.push(AttemptFailure {
                model: step.model.to_string(),
                attempt: step.attempt,
                class,
                message: error.message().to_string(),
            });

            match cascade.on_failure(class) {
                CascadeDecision::RetryAfter(delay) => {
                    if self.budget_spent(started, delay) {
                        // The backoff does not fit; the next candidate needs no wait.
                        tracing::warn!(
                            event_name = "agent.generation.backoff_skipped",
                            kind = kind.as_str(),
                            model = step.model,
                            attempt = step.attempt,
                            backoff_ms = delay.as_millis() as u64,
                            error = %error,
                            "backoff exceeds remaining request budget, advancing"
                        );
                        backoff_cut_short = true;
                        cascade.advance();
                        continue;
                    }
                    tracing::warn!(
                        event_name = "agent.generation.transient_retry",
                        kind = kind.as_str(),
                        model = step.model,
                        attempt = step.attempt,
                        backoff_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient provider failure, retrying after backoff"
                    );
                    self.sleeper.sleep(delay).await;
                }
                CascadeDecision::NextCandidate | CascadeDecision::Exhausted => {
                    log_candidate_abandoned(kind, step.model, step.attempt, &error);
                }
            }
        }

        let reason = if failures.is_empty() {
            DegradedReason::NoCandidates
        } else if backoff_cut_short {
            DegradedReason::BudgetExhausted { failures }
        } else {
            DegradedReason::CandidatesExhausted { failures }
        };
        degraded(kind, reason)
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let call = self.provider.generate(model, prompt);
        match self.settings.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(ProviderError::Transient(format!(
                    "attempt timed out after {}ms",
                    limit.as_millis()
                )))
            }),
            None => call.await,
        }
    }

    fn budget_spent(&self, started: Instant, upcoming: std::time::Duration) -> bool {
        self.settings
            .request_budget
            .is_some_and(|budget| started.elapsed().saturating_add(upcoming) >= budget)
    }
}

fn log_candidate_abandoned(kind: GenerationKind, model: &str, attempt: u32, error: &ProviderError) {
    match error.class() {
        ErrorClass::QuotaExceeded => tracing::warn!(
            event_name = "agent.generation.quota_advance",
            kind = kind.as_str(),
            model,
            attempt,
            error = %error,
            "candidate quota exhausted, advancing"
        ),
        ErrorClass::FatalConfig => tracing::warn!(
            event_name = "agent.generation.fatal_skip",
            kind = kind.as_str(),
            model,
            attempt,
            error = %error,
            "candidate unusable, skipping"
        ),
        ErrorClass::Transient => tracing::warn!(
            event_name = "agent.generation.retries_exhausted",
            kind = kind.as_str(),
            model,
            attempt,
            error = %error,
            "candidate retries exhausted, advancing"
        ),
    }
}

fn degraded(kind: GenerationKind, reason: DegradedReason) -> GenerationOutcome {
    tracing::warn!(
        event_name = "agent.generation.degraded",
        kind = kind.as_str(),
        reason = reason.code(),
        failed_attempts = reason.failures().len(),
        "no candidate produced text, returning fallback"
    );
    GenerationOutcome::Degraded { text: kind.fallback_text().to_string(), reason }
}
