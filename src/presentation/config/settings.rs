use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::ChatPolicy;

use super::{Environment, ErrorMessages};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub inference: InferenceSettings,
    pub chat: ChatSettings,
    pub logging: LoggingSettings,
    pub messages: ErrorMessages,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://relaychat.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Inference backend options, handed to the client at construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub endpoint: String,
    pub model: String,
    pub chat_timeout_seconds: u64,
    /// Bounds the initial request and every subsequent read of a streaming response.
    pub stream_timeout_seconds: u64,
    pub context_limit: usize,
    pub sse_keep_alive_seconds: u64,
}

impl InferenceSettings {
    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_seconds)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_seconds)
    }
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/chat".to_string(),
            model: "gemma3:4b".to_string(),
            chat_timeout_seconds: 60,
            stream_timeout_seconds: 60,
            context_limit: 10,
            sse_keep_alive_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub max_message_length: usize,
    pub title_truncate_length: usize,
    pub recent_conversations_limit: usize,
    /// chrono format string for the `done` event timestamp.
    pub timestamp_format: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_message_length: 10_000,
            title_truncate_length: 50,
            recent_conversations_limit: 5,
            timestamp_format: "%I:%M %p".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info,relaychat=debug,tower_http=debug".to_string(),
            json_format: false,
        }
    }
}

impl Settings {
    /// Layers `appsettings.toml`, `appsettings.{environment}.toml` and `APP__*` variables,
    /// later sources winning. Missing files are fine; every field has a default.
    pub fn load() -> Result<(Environment, Settings), ConfigError> {
        dotenvy::dotenv().ok();

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(ConfigError::Message)?;

        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok((environment, settings))
    }

    pub fn chat_policy(&self) -> ChatPolicy {
        ChatPolicy {
            max_message_length: self.chat.max_message_length,
            title_length: self.chat.title_truncate_length,
            context_limit: self.inference.context_limit,
        }
    }
}
