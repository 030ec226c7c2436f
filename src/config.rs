//! Configuration management for the equipment scanner

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the equipment REST API
    pub base_url: String,
    pub equipment_path: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Window after a resolution during which decode results are dropped
    pub cooldown_ms: u64,
    /// Label fragments that identify an environment-facing camera
    pub rear_camera_keywords: Vec<String>,
    pub event_capacity: usize,
    pub command_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (EQSCAN_API__BASE_URL, ...)
            .add_source(
                Environment::with_prefix("EQSCAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("EQUIPMENT_API_URL").ok())?
            .set_override_option("api.token", env::var("EQUIPMENT_API_TOKEN").ok())?;

        Self::from_builder(builder)
    }

    /// Build from an already assembled source stack
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> AppResult<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::Config("api.base_url must not be empty".into()));
        }
        if self.scanner.event_capacity == 0 || self.scanner.command_capacity == 0 {
            return Err(AppError::Config(
                "scanner channel capacities must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the equipment list endpoint
    pub fn equipment_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.equipment_path.trim_start_matches('/')
        )
    }
}

impl ScannerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            equipment_path: "/api/equipment".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1500,
            rear_camera_keywords: ["back", "rear", "environment", "facing back", "camera2 0"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            event_capacity: 64,
            command_capacity: 16,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
