use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ozunlu_core::config::AppConfig;
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct ResolvedValue {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let values: Vec<ResolvedValue> = entries(&config)
        .into_iter()
        .map(|entry| ResolvedValue {
            source: field_source(
                entry.key,
                entry.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
            key: entry.key,
            value: entry.value,
        })
        .collect();

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        &values,
    )
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    vec![
        Entry {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["OZUNLU_DATABASE_URL"],
        },
        Entry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["OZUNLU_DATABASE_MAX_CONNECTIONS"],
        },
        Entry {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["OZUNLU_DATABASE_TIMEOUT_SECS"],
        },
        Entry {
            key: "storage.backend",
            value: format!("{:?}", config.storage.backend),
            env_keys: &["OZUNLU_STORAGE_BACKEND"],
        },
        Entry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["OZUNLU_SERVER_BIND_ADDRESS"],
        },
        Entry {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["OZUNLU_SERVER_PORT", "PORT"],
        },
        Entry {
            key: "server.allowed_origin",
            value: config.server.allowed_origin.clone(),
            env_keys: &["OZUNLU_SERVER_ALLOWED_ORIGIN"],
        },
        Entry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["OZUNLU_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Entry {
            key: "client.base_url",
            value: config.client.base_url.clone(),
            env_keys: &["OZUNLU_CLIENT_BASE_URL"],
        },
        Entry {
            key: "client.timeout_secs",
            value: config.client.timeout_secs.to_string(),
            env_keys: &["OZUNLU_CLIENT_TIMEOUT_SECS"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["OZUNLU_LOGGING_LEVEL", "OZUNLU_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["OZUNLU_LOGGING_FORMAT", "OZUNLU_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("ozunlu.toml"), PathBuf::from("config/ozunlu.toml")]
        .into_iter()
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
