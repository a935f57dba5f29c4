use std::time::Duration;

use async_trait::async_trait;

use policygen_core::config::{LlmConfig, DEFAULT_MODELS};

use crate::llm::ErrorClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per candidate for transient failures, including the first.
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Delay before the retry that follows the zero-based `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, backoff_base: Duration::from_millis(1_000) }
    }
}

/// Immutable settings for one orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Candidate models in priority order.
    pub candidates: Vec<String>,
    pub retry: RetryPolicy,
    pub attempt_timeout: Option<Duration>,
    /// Wall-clock budget for a whole request, across every candidate.
    pub request_budget: Option<Duration>,
}

impl GenerationSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            candidates: config.models.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_base: Duration::from_millis(config.backoff_base_ms),
            },
            attempt_timeout: non_zero_secs(config.attempt_timeout_secs),
            request_budget: non_zero_secs(config.request_timeout_secs),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_MODELS.iter().map(|model| model.to_string()).collect(),
            retry: RetryPolicy::default(),
            attempt_timeout: Some(Duration::from_secs(30)),
            request_budget: Some(Duration::from_secs(120)),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeDecision {
    /// Wait, then try the same candidate again.
    RetryAfter(Duration),
    /// Move on to the next candidate immediately.
    NextCandidate,
    /// No candidates remain.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadeAttempt<'a> {
    pub candidate_index: usize,
    pub model: &'a str,
    /// Zero-based attempt number against this candidate.
    pub attempt: u32,
}

/// Pure state machine over the candidate list. Quota and configuration
/// failures skip the candidate; transient failures retry it up to the policy
/// limit with exponential backoff.
#[derive(Debug)]
pub struct CandidateCascade<'a> {
    candidates: &'a [String],
    policy: RetryPolicy,
    candidate_index: usize,
    attempt: u32,
}

impl<'a> CandidateCascade<'a> {
    pub fn new(candidates: &'a [String], policy: RetryPolicy) -> Self {
        Self { candidates, policy, candidate_index: 0, attempt: 0 }
    }

    pub fn current(&self) -> Option<CascadeAttempt<'a>> {
        self.candidates.get(self.candidate_index).map(|model| CascadeAttempt {
            candidate_index: self.candidate_index,
            model: model.as_str(),
            attempt: self.attempt,
        })
    }

    pub fn on_failure(&mut self, class: ErrorClass) -> CascadeDecision {
        if self.current().is_none() {
            return CascadeDecision::Exhausted;
        }

        if class == ErrorClass::Transient && self.attempt + 1 < self.policy.max_retries {
            let delay = self.policy.backoff_for(self.attempt);
            self.attempt += 1;
            return CascadeDecision::RetryAfter(delay);
        }

        self.advance()
    }

    /// Abandons the current candidate regardless of remaining retries.
    pub fn advance(&mut self) -> CascadeDecision {
        if self.current().is_none() {
            return CascadeDecision::Exhausted;
        }

        self.candidate_index += 1;
        self.attempt = 0;
        if self.current().is_some() {
            CascadeDecision::NextCandidate
        } else {
            CascadeDecision::Exhausted
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
