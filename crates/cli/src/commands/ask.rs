use serde_json::Value;

use policygen_agent::{Provenance, ProviderClient, Sleeper};

use super::{string_field, CommandResult};
use crate::pipeline::{new_correlation_id, PolicyPipeline};

pub async fn run<P: ProviderClient, S: Sleeper>(
    pipeline: &PolicyPipeline<P, S>,
    payload: &Value,
) -> CommandResult {
    let correlation_id = new_correlation_id();
    let policy_context = string_field(payload, &["policy_context", "policy_text"]).unwrap_or("");
    let question = string_field(payload, &["question"]).unwrap_or("");

    match pipeline.answer_question(&correlation_id, policy_context, question).await {
        Ok(answer) => {
            let message = if answer.provenance == Provenance::Live {
                "question answered"
            } else {
                "question could not be answered"
            };
            CommandResult::with_result("ask", message, &answer)
        }
        Err(error) => CommandResult::from_interface("ask", &error.into_interface(correlation_id)),
    }
}
