pub mod catalog;
pub mod config;
pub mod demo;

use serde::Serialize;
use stockroom_core::config::{AppConfig, LoadOptions};
use stockroom_core::ApplicationError;
use tokio::runtime::Runtime;

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
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
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
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Prefixes human-readable lines ahead of the JSON outcome, which stays the last line.
    pub fn with_preamble(mut self, lines: Vec<String>) -> Self {
        if !lines.is_empty() {
            self.output = format!("{}\n{}", lines.join("\n"), self.output);
        }
        self
    }
}

/// Loads the effective configuration, or the exit-2 failure to report instead.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        let error = ApplicationError::Configuration(error.to_string());
        CommandResult::failure(
            command,
            error.error_class(),
            format!("configuration issue: {error}"),
            2,
        )
    })
}

/// Loads configuration and a current-thread runtime, or the failure to report instead.
pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = load_config(command)?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    match serde_json::to_string(&payload) {
        Ok(line) => line,
        Err(error) => serialization_failure(&payload.command, &error.to_string()),
    }
}

fn serialization_failure(command: &str, message: &str) -> String {
    serde_json::json!({
        "command": command,
        "status": "error",
        "error_class": "serialization",
        "message": message,
    })
    .to_string()
}
