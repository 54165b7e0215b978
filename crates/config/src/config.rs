use std::{
    fs, io,
    path::{Path, PathBuf},
};

use opset_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default value for `log_file_prefix` in [`LoggingConfig`].
const DEFAULT_LOG_FILE_PREFIX: &str = "opset-service";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required authority was left as the zero address.
    #[error("config field '{0}' must not be the zero address")]
    ZeroAddress(&'static str),
}

/// Identity and initial authorities of the service manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address of the service manager itself. Tokens taken into custody are held here.
    pub address: Address,

    /// Initial owner.
    pub owner: Address,

    /// Initial rewards initiator. Defaults to the owner when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards_initiator: Option<Address>,
}

/// Addresses of the external services the manager calls into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorsConfig {
    pub directory: Address,
    pub rewards_coordinator: Address,
    pub registry_coordinator: Address,
    pub stake_registry: Address,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,

    /// Use JSON format for logs instead of compact format.
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_label: None,
            log_dir: None,
            log_file_prefix: default_log_file_prefix(),
            json_format: false,
        }
    }
}

fn default_log_file_prefix() -> String {
    DEFAULT_LOG_FILE_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub collaborators: CollaboratorsConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rewards initiator to install at construction.
    pub fn rewards_initiator(&self) -> Address {
        self.service.rewards_initiator.unwrap_or(self.service.owner)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("service.address", self.service.address),
            ("service.owner", self.service.owner),
            ("collaborators.directory", self.collaborators.directory),
            (
                "collaborators.registry_coordinator",
                self.collaborators.registry_coordinator,
            ),
        ];
        for (field, addr) in required {
            if addr.is_zero() {
                return Err(ConfigError::ZeroAddress(field));
            }
        }
        Ok(())
    }
}

/// Loads and validates the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&raw)
}
