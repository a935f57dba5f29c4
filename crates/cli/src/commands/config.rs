use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use policygen_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

use super::{CommandResult, EXIT_INVALID_INPUT};

struct ConfigField<'a> {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: &'a str,
}

/// Renders the effective config loaded with the same options as every other
/// subcommand, so `--config` and the override flags are honored here too.
pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let config_file_path = match &options.config_path {
        Some(path) => Some(path.clone()),
        None => detect_config_path(),
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overridden = overridden_keys(&options.overrides);

    let provider = format!("{:?}", config.llm.provider);
    let api_key = if config.llm.has_api_key() { "<redacted>" } else { "<unset> (demo mode)" };
    let models = if config.llm.models.is_empty() {
        "<discover from provider>".to_string()
    } else {
        config.llm.models.join(", ")
    };
    let max_retries = config.llm.max_retries.to_string();
    let backoff_base_ms = config.llm.backoff_base_ms.to_string();
    let attempt_timeout_secs = config.llm.attempt_timeout_secs.to_string();
    let request_timeout_secs = config.llm.request_timeout_secs.to_string();
    let log_format = format!("{:?}", config.logging.format);

    let fields = [
        ConfigField {
            key_path: "llm.provider",
            env_keys: &["POLICYGEN_LLM_PROVIDER"],
            value: &provider,
        },
        ConfigField {
            key_path: "llm.api_key",
            env_keys: &["POLICYGEN_LLM_API_KEY", "GEMINI_API_KEY"],
            value: api_key,
        },
        ConfigField {
            key_path: "llm.base_url",
            env_keys: &["POLICYGEN_LLM_BASE_URL"],
            value: &config.llm.base_url,
        },
        ConfigField { key_path: "llm.models", env_keys: &["POLICYGEN_LLM_MODELS"], value: &models },
        ConfigField {
            key_path: "llm.max_retries",
            env_keys: &["POLICYGEN_LLM_MAX_RETRIES"],
            value: &max_retries,
        },
        ConfigField {
            key_path: "llm.backoff_base_ms",
            env_keys: &["POLICYGEN_LLM_BACKOFF_BASE_MS"],
            value: &backoff_base_ms,
        },
        ConfigField {
            key_path: "llm.attempt_timeout_secs",
            env_keys: &["POLICYGEN_LLM_ATTEMPT_TIMEOUT_SECS"],
            value: &attempt_timeout_secs,
        },
        ConfigField {
            key_path: "llm.request_timeout_secs",
            env_keys: &["POLICYGEN_LLM_REQUEST_TIMEOUT_SECS"],
            value: &request_timeout_secs,
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["POLICYGEN_LOGGING_LEVEL", "POLICYGEN_LOG_LEVEL"],
            value: &config.logging.level,
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["POLICYGEN_LOGGING_FORMAT", "POLICYGEN_LOG_FORMAT"],
            value: &log_format,
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source = if overridden.contains(&field.key_path) {
            "command-line flag".to_string()
        } else {
            field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            )
        };
        render_line(field.key_path, field.value, source)
    }));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn overridden_keys(overrides: &ConfigOverrides) -> Vec<&'static str> {
    [
        ("llm.provider", overrides.llm_provider.is_some()),
        ("llm.models", overrides.llm_models.is_some()),
        ("llm.max_retries", overrides.llm_max_retries.is_some()),
        ("logging.level", overrides.log_level.is_some()),
    ]
    .into_iter()
    .filter_map(|(key_path, set)| set.then_some(key_path))
    .collect()
}

fn detect_config_path() -> Option<PathBuf> {
    ["policygen.toml", "config/policygen.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
