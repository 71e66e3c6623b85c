pub mod config;
pub mod health;
pub mod migrate;
pub mod quotes;
pub mod request;

use serde::Serialize;

use ozunlu_core::config::{AppConfig, LoadOptions};

use crate::client::{ClientError, HttpIntakeClient};

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
        Self::ok_payload(command, message.into(), None)
    }

    pub fn success_with_data<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: &T,
    ) -> Self {
        Self::ok_payload(command, message.into(), serde_json::to_value(data).ok())
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

    fn ok_payload(command: &str, message: String, data: Option<serde_json::Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Builds an HTTP client from config, with `--base-url` taking precedence.
fn intake_client(command: &str, base_url: Option<String>) -> Result<HttpIntakeClient, CommandResult> {
    let mut config = load_config(command)?;
    if let Some(base_url) = base_url {
        config.client.base_url = base_url;
    }
    HttpIntakeClient::from_config(&config.client).map_err(|error| client_failure(command, &error))
}

fn client_failure(command: &str, error: &ClientError) -> CommandResult {
    match error {
        ClientError::Transport(_) => {
            CommandResult::failure(command, "service_unreachable", error.to_string(), 6)
        }
        ClientError::Rejected { status: 404, .. } => {
            CommandResult::failure(command, "not_found", error.to_string(), 8)
        }
        ClientError::Rejected { .. } => {
            CommandResult::failure(command, "rejected", error.to_string(), 7)
        }
        ClientError::UnexpectedBody(_) => {
            CommandResult::failure(command, "unexpected_response", error.to_string(), 6)
        }
        ClientError::InvalidUrl(_) => {
            CommandResult::failure(command, "config_validation", error.to_string(), 2)
        }
    }
}
