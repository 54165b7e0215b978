//! Logging initialization.

use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::types::{LoggerConfig, LoggingError};

/// Builds the env filter for `config`.
///
/// `RUST_LOG` takes precedence over the configured default level; configured directives are
/// applied last.
pub fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggingError> {
    let mut filt = EnvFilter::builder()
        .with_default_directive(config.default_level.into())
        .from_env_lossy();

    for directive in &config.directives {
        let parsed = directive
            .parse()
            .map_err(|source| LoggingError::InvalidDirective {
                directive: directive.clone(),
                source,
            })?;
        filt = filt.add_directive(parsed);
    }

    Ok(filt)
}

/// Initializes the logging subsystem with the provided config.
///
/// Fails if a directive is malformed or a global subscriber was already installed.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let filt = build_env_filter(&config)?;

    // Configure stdout logging with JSON or compact format
    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt)
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt)
            .boxed()
    };

    // Build optional file logging layer
    let file_layer = match config.file_logging_config.as_ref() {
        Some(file_config) => {
            let file_appender = RollingFileAppender::new(
                file_config.rotation.clone(),
                &file_config.directory,
                &file_config.file_name_prefix,
            );
            let file_filt = build_env_filter(&config)?;

            let layer = if file_config.json_format {
                layer()
                    .json()
                    .with_writer(file_appender)
                    .with_ansi(false) // No color codes in files
                    .with_filter(file_filt)
                    .boxed()
            } else {
                layer()
                    .compact()
                    .with_writer(file_appender)
                    .with_ansi(false) // No color codes in files
                    .with_filter(file_filt)
                    .boxed()
            };
            Some(layer)
        }
        None => None,
    };

    // with() accepts Option<Layer>, so the file layer is simply skipped when absent
    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .try_init()?;

    info!(
        service_name = %config.service_name,
        file_logging = config.file_logging_config.is_some(),
        "logging initialized"
    );

    Ok(())
}
