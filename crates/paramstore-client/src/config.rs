//! Configuration management for paramstore clients.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use paramstore_client::config::ClientConfig;
//!
//! // Load from file with env overrides
//! let config = ClientConfig::load("paramstore.yaml")?;
//!
//! // Or load from environment only
//! let config = ClientConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use paramstore_domain::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for every setting.
const ENV_PREFIX: &str = "PARAMSTORE";

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    /// Batching and request settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Settings applied to every facade operation.
///
/// Environment variables use the `PARAMSTORE_` prefix and `__` as the nested
/// key separator:
///
/// - `PARAMSTORE_CLIENT__BATCH_SIZE=5`
/// - `PARAMSTORE_CLIENT__WITH_DECRYPTION=true`
/// - `PARAMSTORE_CLIENT__KEY_ID=alias/app`
/// - `PARAMSTORE_CLIENT__REGION=eu-west-1`
///
/// # Example YAML Configuration
///
/// ```yaml
/// client:
///   batch_size: 10
///   with_decryption: true
///   key_id: alias/app
///   region: ap-southeast-2
///   call_timeout_secs: 30
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientSettings {
    /// Names per remote call, between 1 and 10.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Decrypt `SecureString` values on reads.
    #[serde(default)]
    pub with_decryption: bool,

    /// KMS key forwarded on writes.
    pub key_id: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    /// Default timeout applied to each remote call.
    pub call_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            with_decryption: false,
            key_id: None,
            region: default_region(),
            call_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_region() -> String {
    "ap-southeast-2".to_string()
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Storage backend type: "memory" or "ssm"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Endpoint override for the ssm backend
    pub endpoint_url: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            endpoint_url: None,
        }
    }
}

fn default_storage_backend() -> String {
    "ssm".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,

    /// Log span enter and exit events
    #[serde(default)]
    pub spans: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            spans: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ClientConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `PARAMSTORE_` and use `__` as
    /// separator, e.g. `PARAMSTORE_CLIENT__BATCH_SIZE=5` overrides
    /// `client.batch_size`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ClientConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()?;

        let client_config: ClientConfig = config.try_deserialize()?;
        client_config.validate()?;

        Ok(client_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ClientConfig::default())?)
            .add_source(environment())
            .build()?;

        let client_config: ClientConfig = config.try_deserialize()?;
        client_config.validate()?;

        Ok(client_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let batch_size = self.client.batch_size;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "client.batch_size must be between 1 and {MAX_BATCH_SIZE}, got: {batch_size}"
                ),
            });
        }

        if self.client.region.trim().is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: "client.region cannot be empty".to_string(),
            });
        }

        if self.client.call_timeout_secs == Some(0) {
            return Err(ConfigLoadError::Invalid {
                message: "client.call_timeout_secs must be greater than 0".to_string(),
            });
        }

        let valid_backends = ["memory", "ssm"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "storage.backend must be one of: {:?}, got: {}",
                    valid_backends, self.storage.backend
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

// PARAMSTORE_CLIENT__BATCH_SIZE -> client.batch_size
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
