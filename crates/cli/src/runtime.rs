use std::sync::Arc;

use policygen_agent::{
    GeminiClient, GenerationOrchestrator, GenerationSettings, OfflineProvider, ProviderClient,
    TokioSleeper,
};
use policygen_core::config::{AppConfig, LlmProvider};
use policygen_core::ApplicationError;
use policygen_db::InMemoryPolicyStore;

use crate::pipeline::PolicyPipeline;

pub type DynProvider = Box<dyn ProviderClient>;

/// Everything a command needs, built once from the effective config.
pub struct CliRuntime {
    pub config: AppConfig,
    pub pipeline: PolicyPipeline<DynProvider>,
}

impl CliRuntime {
    pub async fn from_config(config: AppConfig) -> Result<Self, ApplicationError> {
        let provider = build_provider(&config)?;
        let settings = GenerationSettings::from_config(&config.llm);
        let generator = GenerationOrchestrator::discover(provider, settings, TokioSleeper).await;
        let pipeline = PolicyPipeline::new(generator, Arc::new(InMemoryPolicyStore::default()));

        Ok(Self { config, pipeline })
    }
}

pub fn build_provider(config: &AppConfig) -> Result<DynProvider, ApplicationError> {
    match config.llm.provider {
        LlmProvider::Offline => Ok(Box::new(OfflineProvider)),
        LlmProvider::Gemini => {
            if !config.llm.has_api_key() {
                tracing::warn!(
                    event_name = "system.llm.demo_mode",
                    correlation_id = "bootstrap",
                    "no llm api key configured; generation will return fallback output"
                );
            }
            let client = GeminiClient::from_config(&config.llm)
                .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
            Ok(Box::new(client))
        }
    }
}
