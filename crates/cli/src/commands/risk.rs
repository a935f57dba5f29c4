use serde_json::Value;

use policygen_core::{ClientProfile, DeterministicRiskEngine, RiskEngine};

use super::CommandResult;

/// Accepts either a bare profile or `{ "client_details": { ... } }`.
pub fn run(payload: &Value) -> CommandResult {
    let profile = ClientProfile::from_json(payload.get("client_details").unwrap_or(payload));
    let assessment = DeterministicRiskEngine.assess(&profile);

    CommandResult::with_result(
        "risk",
        format!("risk assessment completed with a {} risk level", assessment.score),
        &assessment,
    )
}
