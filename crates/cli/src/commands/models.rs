use serde::Serialize;

use policygen_agent::{ProviderClient, Sleeper};
use policygen_core::ApplicationError;

use super::CommandResult;
use crate::pipeline::{new_correlation_id, PolicyPipeline};

#[derive(Debug, Serialize)]
struct ModelListing {
    /// Candidates in the order the orchestrator tries them.
    candidates: Vec<String>,
    /// Generation-capable models the provider reports.
    available: Vec<String>,
}

pub async fn run<P: ProviderClient, S: Sleeper>(
    pipeline: &PolicyPipeline<P, S>,
) -> CommandResult {
    let generator = pipeline.generator();
    let candidates = generator.settings().candidates.clone();

    match generator.provider().list_candidate_models().await {
        Ok(available) => {
            let message =
                format!("{} candidate(s), {} available", candidates.len(), available.len());
            CommandResult::with_result("models", message, &ModelListing { candidates, available })
        }
        Err(error) => {
            let correlation_id = new_correlation_id();
            tracing::warn!(
                event_name = "agent.generation.candidate_discovery_failed",
                correlation_id = %correlation_id,
                error_class = error.class().as_str(),
                error = %error,
                "model listing failed"
            );
            let error = ApplicationError::Integration(error.to_string());
            CommandResult::from_interface("models", &error.into_interface(correlation_id))
        }
    }
}
