//! Binary entry-point for the offline operator-set migration tool.
//!
//! Reads a registry snapshot, plans the quorum to operator-set migration and dry-runs it through
//! a service manager whose outward calls are only recorded.
mod cli;
mod cmd;
mod errors;
mod offline;
mod output;

use opset_common::logging::{self, LoggerConfig, LoggingInitConfig};
use opset_config::{load_config, Config};

use crate::{
    cli::{Cli, Command},
    cmd::{plan::plan, simulate::simulate, strategies::get_strategies},
    errors::{DisplayableError, DisplayedError},
};

const SERVICE_NAME: &str = "opset-migrate";

fn main() {
    let cli: Cli = argh::from_env();

    let config = cli
        .config
        .as_deref()
        .map(load_config)
        .transpose()
        .user_error("Failed to load config")
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });

    init_logging(config.as_ref()).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    let result = match cli.cmd {
        Command::Plan(args) => plan(args),
        Command::Strategies(args) => get_strategies(args),
        Command::Simulate(args) => simulate(config.as_ref(), args),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Sets up logging from the config's logging section, or with defaults when no config is given.
fn init_logging(config: Option<&Config>) -> Result<(), DisplayedError> {
    match config {
        Some(config) => {
            let logging = &config.logging;
            logging::init_logging_from_config(LoggingInitConfig {
                service_base_name: SERVICE_NAME,
                service_label: logging.service_label.as_deref(),
                log_dir: logging.log_dir.as_ref(),
                log_file_prefix: Some(logging.log_file_prefix.as_str()),
                json_format: Some(logging.json_format),
                default_log_prefix: SERVICE_NAME,
            })
        }
        None => logging::init(LoggerConfig::new(SERVICE_NAME.to_string())),
    }
    .internal_error("Failed to initialize logging")
}
