use serde::Serialize;

use policygen_core::{ClientProfile, CoverageRequest, PricingQuote, RiskAssessment};

pub const POLICY_SECTIONS: [&str; 5] = [
    "Policy Overview",
    "Detailed Coverage",
    "Terms & Conditions",
    "Exclusions",
    "Premium and Payment Schedule",
];

pub const NOT_IN_POLICY: &str = "This information is not available in the provided policy";

/// Inputs for an initial policy draft.
#[derive(Clone, Copy, Debug)]
pub struct PolicyDraftRequest<'a> {
    pub client: &'a ClientProfile,
    pub coverage: &'a CoverageRequest,
    pub risk_assessment: &'a RiskAssessment,
    pub pricing: &'a PricingQuote,
}

pub fn policy_prompt(request: &PolicyDraftRequest<'_>) -> String {
    let sections = POLICY_SECTIONS
        .iter()
        .enumerate()
        .map(|(index, section)| format!("{}. {section}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an insurance underwriting assistant drafting a policy document.\n\n\
         Client profile:\n{client}\n\n\
         Requested coverage:\n{coverage}\n\n\
         Risk assessment:\n{risk}\n\n\
         Pricing:\n{pricing}\n\n\
         Write a complete {insurance_type} insurance policy in Markdown with these sections:\n\
         {sections}\n\n\
         Use a professional, plain-language tone. State the premium figures exactly as given \
         above; do not recalculate them.",
        client = to_json(request.client),
        coverage = to_json(request.coverage),
        risk = to_json(request.risk_assessment),
        pricing = to_json(request.pricing),
        insurance_type = request.coverage.insurance_type,
    )
}

pub fn refinement_prompt(current_policy: &str, instruction: &str) -> String {
    format!(
        "You are revising an existing insurance policy document.\n\n\
         Current policy:\n{current_policy}\n\n\
         Requested change: \"{instruction}\"\n\n\
         Apply the change and return only the full updated policy in Markdown. Keep the \
         existing section structure and tone. Do not add commentary before or after the \
         document."
    )
}

pub fn question_prompt(policy_context: &str, question: &str) -> String {
    format!(
        "Answer a question about the insurance policy below using only its contents.\n\n\
         Policy:\n{policy_context}\n\n\
         Question: {question}\n\n\
         If the policy does not contain the answer, reply exactly: \"{NOT_IN_POLICY}\"."
    )
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
