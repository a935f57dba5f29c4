use serde_json::Value;

use policygen_agent::{Provenance, ProviderClient, Sleeper};
use policygen_db::PolicyId;

use super::{string_field, CommandResult};
use crate::pipeline::{new_correlation_id, PolicyPipeline};

/// Reads `{ policy_id?, instruction, current_policy? }`. `refinement_prompt`
/// and `policy_text` are accepted as aliases.
pub async fn run<P: ProviderClient, S: Sleeper>(
    pipeline: &PolicyPipeline<P, S>,
    payload: &Value,
) -> CommandResult {
    let correlation_id = new_correlation_id();
    let policy_id = string_field(payload, &["policy_id"]).map(|id| PolicyId(id.to_string()));
    let instruction = string_field(payload, &["instruction", "refinement_prompt"]).unwrap_or("");
    let current_text = string_field(payload, &["current_policy", "policy_text"]);

    let refined = pipeline
        .refine_policy(&correlation_id, policy_id.as_ref(), instruction, current_text)
        .await;
    match refined {
        Ok(refined) => {
            let message = if refined.provenance == Provenance::Live {
                "policy refined"
            } else {
                "policy refinement unavailable"
            };
            CommandResult::with_result("refine", message, &refined)
        }
        Err(error) => {
            CommandResult::from_interface("refine", &error.into_interface(correlation_id))
        }
    }
}
