pub mod ask;
pub mod config;
pub mod generate;
pub mod models;
pub mod price;
pub mod refine;
pub mod risk;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use policygen_core::InterfaceError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_UNAVAILABLE: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
}

impl CommandResult {
    /// Success envelope carrying a structured result.
    pub fn with_result<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        result: &T,
    ) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success_with(command, message, Some(value)),
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_FAILURE),
        }
    }

    fn success_with(command: &str, message: impl Into<String>, result: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            result,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            result: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_interface(command: &str, error: &InterfaceError) -> Self {
        // Only validation messages are safe to echo back verbatim.
        let (message, exit_code) = match error {
            InterfaceError::BadRequest { .. } => (error.message(), EXIT_INVALID_INPUT),
            InterfaceError::ServiceUnavailable { .. } => (error.user_message(), EXIT_UNAVAILABLE),
            InterfaceError::Internal { .. } => (error.user_message(), EXIT_FAILURE),
        };

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            message: message.to_string(),
            correlation_id: Some(error.correlation_id().to_string()),
            result: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Reads a JSON document from `path`, or from stdin when no path is given.
/// Blank input is treated as an empty object so every field takes its default.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).context("failed to read stdin")?;
            raw
        }
    };

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&raw).context("input is not valid JSON")
}

pub fn invalid_input(command: &str, message: impl Into<String>) -> CommandResult {
    CommandResult::failure(command, "invalid_input", message, EXIT_INVALID_INPUT)
}

fn string_field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| payload.get(*key).and_then(Value::as_str))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
