//! Tracing subscriber initialization

use std::io;

use tg_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::InfrastructureError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `LoggingConfig::level` when set. Fails if a global
/// subscriber has already been installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let env_filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .json(),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(config.colored)
                    .with_file(config.source_location)
                    .with_line_number(config.source_location)
                    .with_target(true)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(config.colored)
                    .with_target(false)
                    .with_writer(io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| InfrastructureError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!(level = %config.level, format = ?config.format, "Tracing initialized");
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, InfrastructureError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .map_err(|e| InfrastructureError::Config(format!("Invalid log level '{}': {}", config.level, e)))
}
