use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Largest accepted request body. Audio arrives base64 encoded, so this
/// allows recordings of roughly three quarters of it.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorage {
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub surprise_temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub device_type: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub deadline_ms: u64,
    pub history_limit: u32,
}

impl Pipeline {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            device_type: String::from("light"),
            max_attempts: 3,
            retry_delay_ms: 500,
            deadline_ms: 5000,
            history_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub object_storage: ObjectStorage,
    pub generation: Generation,
    #[serde(default)]
    pub pipeline: Pipeline,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("LUMIGLOW").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.check()?;

        Ok(settings)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.generation.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "generation.api_key is not set (LUMIGLOW_GENERATION__API_KEY)".into(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "server.max_body_bytes must be greater than zero".into(),
            ));
        }

        if self.pipeline.max_attempts == 0 {
            return Err(ConfigError::Message(
                "pipeline.max_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
