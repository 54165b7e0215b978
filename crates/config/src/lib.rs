//! Configuration for the operator-set service manager.

mod config;

pub use config::{
    load_config, CollaboratorsConfig, Config, ConfigError, LoggingConfig, ServiceConfig,
};
