use std::env;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use policygen_agent::fallback::{FALLBACK_POLICY, QUESTION_UNAVAILABLE};
use policygen_agent::{
    GenerationOrchestrator, GenerationSettings, OfflineProvider, ProviderClient, ProviderError,
};
use policygen_cli::commands::{ask, config, generate, models, price, refine, risk};
use policygen_cli::pipeline::PolicyPipeline;
use policygen_core::config::{ConfigOverrides, LlmProvider, LoadOptions};
use policygen_db::InMemoryPolicyStore;

#[test]
fn risk_scores_a_high_risk_profile() {
    let result = risk::run(&json!({
        "client_details": {
            "age": 65,
            "income": 15000,
            "medical_history": true,
            "lifestyle": "high_risk"
        }
    }));
    assert_eq!(result.exit_code, 0, "expected successful risk assessment");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "risk");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["result"]["score"], "High");
    assert_eq!(payload["result"]["score_value"], 1.0);
    assert_eq!(payload["result"]["factors"].as_array().map(Vec::len), Some(4));
}

#[test]
fn risk_defaults_malformed_fields() {
    let result = risk::run(&json!({ "age": "not a number", "income": -5 }));

    let payload = parse_payload(&result.output);
    assert_eq!(payload["result"]["score"], "Medium");
    assert_eq!(payload["result"]["score_value"], 0.5);
}

#[test]
fn price_defaults_to_medium_life_coverage() {
    let result = price::run(&json!({}));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "price");
    assert_eq!(payload["result"]["monthly_premium"], 45.0);
    assert_eq!(payload["result"]["yearly_premium"], 513.0);
    assert_eq!(payload["result"]["breakdown"]["base_premium"], 10.0);
    assert_eq!(payload["result"]["breakdown"]["processing_fee"], 10.0);
    assert_eq!(payload["result"]["breakdown"]["rider_costs"], 25.0);
}

#[test]
fn price_echoes_unknown_risk_label_with_neutral_multiplier() {
    let result = price::run(&json!({
        "risk_score": "Severe",
        "coverage_amount": "250000",
        "type": "auto"
    }));

    let payload = parse_payload(&result.output);
    let explanation = payload["result"]["explanation"].as_str().expect("explanation");
    assert!(explanation.contains("auto insurance with a Severe risk profile"));
    assert!(explanation.contains("adjusted by 1.0x"));
    assert_eq!(payload["result"]["breakdown"]["risk_adjustment"], 0.0);
}

#[tokio::test]
async fn generate_returns_fallback_policy_offline() {
    let pipeline = offline_pipeline();

    let result = generate::run(
        &pipeline,
        &json!({
            "client_details": { "age": 35, "income": 70000 },
            "insurance_details": { "coverage_amount": 100000, "type": "life" }
        }),
    )
    .await;
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "generate");
    assert_eq!(payload["result"]["provenance"], "degraded");
    assert_eq!(payload["result"]["policy_text"], FALLBACK_POLICY);
    assert!(payload["result"]["policy_id"].is_string());
}

#[tokio::test]
async fn refine_without_instruction_is_a_bad_request() {
    let pipeline = offline_pipeline();

    let result = refine::run(&pipeline, &json!({ "current_policy": "# Policy" })).await;
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "refine");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "bad_request");
    assert!(payload["correlation_id"].as_str().is_some_and(|id| id.starts_with("req-")));
}

#[tokio::test]
async fn ask_signals_unavailable_answer_offline() {
    let pipeline = offline_pipeline();

    let result = ask::run(
        &pipeline,
        &json!({ "policy_context": "# Policy", "question": "What is covered?" }),
    )
    .await;

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "question could not be answered");
    assert_eq!(payload["result"]["answer"], QUESTION_UNAVAILABLE);
    assert_eq!(payload["result"]["provenance"], "degraded");
}

#[tokio::test]
async fn models_lists_configured_candidates() {
    let pipeline = offline_pipeline();

    let result = models::run(&pipeline).await;

    let payload = parse_payload(&result.output);
    assert_eq!(payload["result"]["candidates"], json!(["test-model"]));
    assert_eq!(payload["result"]["available"], json!([]));
}

#[tokio::test]
async fn models_listing_failure_is_reported_as_unavailable() {
    let settings = GenerationSettings::default().with_candidates(vec!["test-model".to_string()]);
    let pipeline = PolicyPipeline::new(
        GenerationOrchestrator::new(ListingDownProvider, settings),
        Arc::new(InMemoryPolicyStore::default()),
    );

    let result = models::run(&pipeline).await;
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "service_unavailable");
    assert!(!result.output.contains("listing endpoint down"));
    assert!(payload["correlation_id"].as_str().is_some_and(|id| id.starts_with("req-")));
}

#[test]
fn config_reports_env_sources_and_redacts_key() {
    with_env(
        &[
            ("POLICYGEN_LLM_API_KEY", "super-secret-key"),
            ("POLICYGEN_LLM_MODELS", "model-a,model-b"),
        ],
        || {
            let result = config::run(&LoadOptions::default());
            assert_eq!(result.exit_code, 0);
            let output = result.output;

            assert!(output
                .contains("llm.models = model-a, model-b (source: env (POLICYGEN_LLM_MODELS))"));
            assert!(output.contains("llm.api_key = <redacted>"));
            assert!(!output.contains("super-secret-key"));
            assert!(output.contains("logging.level = info (source: default)"));
        },
    );
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("POLICYGEN_LLM_MAX_RETRIES", "0")], || {
        let result = config::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
        let message = payload["message"].as_str().expect("message");
        assert!(message.starts_with("config validation failed"), "got: {message}");
    });
}

#[test]
fn config_reads_the_explicit_file_and_flag_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[llm]\nmax_retries = 7\n").expect("write config");

    with_env(&[], || {
        let result = config::run(&LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::Offline),
                ..ConfigOverrides::default()
            },
        });
        assert_eq!(result.exit_code, 0);

        let expected_retries =
            format!("llm.max_retries = 7 (source: file ({}))", path.display());
        assert!(result.output.contains(&expected_retries), "got: {}", result.output);
        assert!(result.output.contains("llm.provider = Offline (source: command-line flag)"));
    });
}

#[test]
fn config_rejects_a_missing_explicit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does_not_exist.toml");

    with_env(&[], || {
        let result = config::run(&LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });

        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["status"], "error");
    });
}

fn offline_pipeline() -> PolicyPipeline<OfflineProvider> {
    let settings = GenerationSettings::default().with_candidates(vec!["test-model".to_string()]);
    PolicyPipeline::new(
        GenerationOrchestrator::new(OfflineProvider, settings),
        Arc::new(InMemoryPolicyStore::default()),
    )
}

struct ListingDownProvider;

#[async_trait]
impl ProviderClient for ListingDownProvider {
    async fn list_candidate_models(&self) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::classify(Some(503), "listing endpoint down"))
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::classify(Some(503), "generation endpoint down"))
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "POLICYGEN_LLM_PROVIDER",
        "POLICYGEN_LLM_API_KEY",
        "GEMINI_API_KEY",
        "POLICYGEN_LLM_BASE_URL",
        "POLICYGEN_LLM_MODELS",
        "POLICYGEN_LLM_MAX_RETRIES",
        "POLICYGEN_LLM_BACKOFF_BASE_MS",
        "POLICYGEN_LLM_ATTEMPT_TIMEOUT_SECS",
        "POLICYGEN_LLM_REQUEST_TIMEOUT_SECS",
        "POLICYGEN_LOGGING_LEVEL",
        "POLICYGEN_LOGGING_FORMAT",
        "POLICYGEN_LOG_LEVEL",
        "POLICYGEN_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
