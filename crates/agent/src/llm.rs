use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// How the candidate cascade reacts to a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Rate limited or out of quota. Skip the candidate without retrying.
    QuotaExceeded,
    /// Network trouble, timeouts, 5xx. Retry the same candidate with backoff.
    Transient,
    /// Bad credentials or unknown model. Skip the candidate without retrying.
    FatalConfig,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuotaExceeded => "quota_exceeded",
            Self::Transient => "transient",
            Self::FatalConfig => "fatal_config",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("transient provider failure: {0}")]
    Transient(String),
    #[error("provider configuration error: {0}")]
    FatalConfig(String),
}

impl ProviderError {
    /// Classifies a provider failure from its HTTP status (when one exists) and
    /// message body. Quota signals win over status-based classification.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_ascii_lowercase();

        let quota = status == Some(429)
            || lowered.contains("quota")
            || lowered.contains("429")
            || lowered.contains("rate limit")
            || lowered.contains("resource_exhausted");
        if quota {
            return Self::QuotaExceeded(message);
        }

        let fatal = matches!(status, Some(400 | 401 | 403 | 404))
            || lowered.contains("api key not valid")
            || lowered.contains("permission_denied");
        if fatal {
            return Self::FatalConfig(message);
        }

        Self::Transient(message)
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::QuotaExceeded(_) => ErrorClass::QuotaExceeded,
            Self::Transient(_) => ErrorClass::Transient,
            Self::FatalConfig(_) => ErrorClass::FatalConfig,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExceeded(message)
            | Self::Transient(message)
            | Self::FatalConfig(message) => message,
        }
    }
}

/// Hosted text-generation service. One call per attempt; retries and
/// fallback are handled by the orchestrator.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Models usable for text generation, in the provider's order.
    async fn list_candidate_models(&self) -> Result<Vec<String>, ProviderError>;

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

#[async_trait]
impl<T: ProviderClient + ?Sized> ProviderClient for Box<T> {
    async fn list_candidate_models(&self) -> Result<Vec<String>, ProviderError> {
        (**self).list_candidate_models().await
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        (**self).generate(model, prompt).await
    }
}

/// Provider used when no live service is configured. Every attempt fails as a
/// configuration error, so requests degrade immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineProvider;

#[async_trait]
impl ProviderClient for OfflineProvider {
    async fn list_candidate_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::FatalConfig("offline provider does not generate text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorClass, OfflineProvider, ProviderClient, ProviderError};

    #[test]
    fn status_429_and_quota_messages_classify_as_quota() {
        assert_eq!(
            ProviderError::classify(Some(429), "slow down").class(),
            ErrorClass::QuotaExceeded
        );
        assert_eq!(
            ProviderError::classify(Some(403), "Quota exceeded for metric").class(),
            ErrorClass::QuotaExceeded
        );
        assert_eq!(
            ProviderError::classify(None, "RESOURCE_EXHAUSTED").class(),
            ErrorClass::QuotaExceeded
        );
    }

    #[test]
    fn auth_and_unknown_model_statuses_classify_as_fatal() {
        for status in [400, 401, 403, 404] {
            assert_eq!(
                ProviderError::classify(Some(status), "denied").class(),
                ErrorClass::FatalConfig,
                "status {status}"
            );
        }
        assert_eq!(
            ProviderError::classify(None, "API key not valid. Please pass a valid key.").class(),
            ErrorClass::FatalConfig
        );
    }

    #[test]
    fn server_errors_and_unknown_failures_are_transient() {
        let unavailable = ProviderError::classify(Some(503), "unavailable");
        let reset = ProviderError::classify(None, "connection reset");

        assert_eq!(unavailable.class(), ErrorClass::Transient);
        assert_eq!(reset.class(), ErrorClass::Transient);
    }

    #[test]
    fn classify_keeps_the_provider_message() {
        let error = ProviderError::classify(Some(500), "upstream exploded");
        assert_eq!(error.message(), "upstream exploded");
    }

    #[tokio::test]
    async fn offline_provider_fails_every_attempt_as_fatal() {
        let provider = OfflineProvider;

        assert!(provider.list_candidate_models().await.expect("listing").is_empty());
        let error = provider.generate("gemini-2.5-flash", "prompt").await.expect_err("offline");
        assert_eq!(error.class(), ErrorClass::FatalConfig);
    }
}
