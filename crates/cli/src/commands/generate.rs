use serde_json::Value;

use policygen_agent::{ProviderClient, Sleeper};

use super::CommandResult;
use crate::pipeline::{new_correlation_id, PolicyPipeline};

pub async fn run<P: ProviderClient, S: Sleeper>(
    pipeline: &PolicyPipeline<P, S>,
    payload: &Value,
) -> CommandResult {
    let client_details = payload.get("client_details").unwrap_or(&Value::Null);
    let insurance_details = payload.get("insurance_details").unwrap_or(&Value::Null);

    let created =
        pipeline.create_policy(&new_correlation_id(), client_details, insurance_details).await;
    let message = match &created.policy_id {
        Some(policy_id) => format!("policy {policy_id} created"),
        None => "policy created but not persisted".to_string(),
    };

    CommandResult::with_result("generate", message, &created)
}
