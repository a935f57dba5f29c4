use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use policygen_core::config::LlmConfig;

use crate::llm::{ProviderClient, ProviderError};

const API_KEY_HEADER: &str = "x-goog-api-key";
const GENERATE_METHOD: &str = "generateContent";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| {
            ProviderError::FatalConfig(format!("failed to build http client: {error}"))
        })?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), api_key })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let timeout = (config.attempt_timeout_secs > 0)
            .then(|| Duration::from_secs(config.attempt_timeout_secs));
        Self::new(config.base_url.clone(), config.api_key.clone(), timeout)
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{GENERATE_METHOD}",
            self.base_url,
            model.trim_start_matches("models/")
        )
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().trim())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::FatalConfig("llm.api_key is not configured (demo mode)".to_string())
            })?;
        Ok(request.header(API_KEY_HEADER, key))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn list_candidate_models(&self) -> Result<Vec<String>, ProviderError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.authorized(self.client.get(self.models_url()))?;
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = checked(request.send().await.map_err(transport_error)?).await?;
            let page: ModelListResponse = response.json().await.map_err(|error| {
                ProviderError::Transient(format!("failed to decode model listing: {error}"))
            })?;

            models.extend(page.generation_models());
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });
        let request = self.authorized(self.client.post(self.generate_url(model)))?.json(&body);

        let response = checked(request.send().await.map_err(transport_error)?).await?;
        let payload: GenerateContentResponse = response.json().await.map_err(|error| {
            ProviderError::Transient(format!("failed to decode generation response: {error}"))
        })?;

        payload
            .first_text()
            .ok_or_else(|| ProviderError::Transient(format!("model `{model}` returned no text")))
    }
}

async fn checked(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("provider returned {status}: {body}");
    Err(ProviderError::classify(Some(status.as_u16()), message))
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_builder() {
        return ProviderError::FatalConfig(format!("invalid provider request: {error}"));
    }
    ProviderError::Transient(format!("provider request failed: {error}"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelListResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
    next_page_token: Option<String>,
}

impl ModelListResponse {
    fn generation_models(&self) -> impl Iterator<Item = String> + '_ {
        self.models
            .iter()
            .filter(|model| model.supported_generation_methods.iter().any(|m| m == GENERATE_METHOD))
            .map(|model| model.name.trim_start_matches("models/").to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text =
            content.parts.iter().filter_map(|part| part.text.as_deref()).collect::<String>();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{GeminiClient, GenerateContentResponse, ModelListResponse};
    use crate::llm::{ErrorClass, ProviderClient};

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client =
            GeminiClient::new("https://example.test/", None, None).expect("client builds");

        assert_eq!(
            client.generate_url("models/gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.models_url(), "https://example.test/v1beta/models");
    }

    #[test]
    fn listing_keeps_only_generation_capable_models() {
        let page: ModelListResponse = serde_json::from_value(json!({
            "models": [
                { "name": "models/gemini-2.5-flash",
                  "supportedGenerationMethods": ["generateContent", "countTokens"] },
                { "name": "models/text-embedding-004",
                  "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/gemini-2.0-flash",
                  "supportedGenerationMethods": ["generateContent"] }
            ]
        }))
        .expect("listing decodes");

        let models = page.generation_models().collect::<Vec<_>>();
        assert_eq!(models, vec!["gemini-2.5-flash".to_string(), "gemini-2.0-flash".to_string()]);
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn generation_text_joins_parts_of_first_candidate() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "# Policy" }, { "text": "\nBody" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .expect("payload decodes");

        assert_eq!(payload.first_text().as_deref(), Some("# Policy\nBody"));
    }

    #[test]
    fn blank_or_missing_candidates_yield_no_text() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({})).expect("empty payload decodes");
        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .expect("blocked payload decodes");

        assert!(empty.first_text().is_none());
        assert!(blocked.first_text().is_none());
    }

    #[tokio::test]
    async fn missing_api_key_fails_as_fatal_config_without_network() {
        let client =
            GeminiClient::new("https://example.invalid", None, None).expect("client builds");

        let error = client.generate("gemini-2.5-flash", "prompt").await.expect_err("no key");
        assert_eq!(error.class(), ErrorClass::FatalConfig);

        let error = client.list_candidate_models().await.expect_err("no key");
        assert_eq!(error.class(), ErrorClass::FatalConfig);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let client = GeminiClient::new(
            "https://example.test",
            Some("super-secret-key".to_string().into()),
            None,
        )
        .expect("client builds");

        let rendered = format!("{client:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
