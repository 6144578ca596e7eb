use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Server logging: compact lines on stdout, `RUST_LOG` overriding the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level)?)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// One-shot commands print JSON on stdout, so diagnostics go to stderr and default to warnings.
pub fn init_for_cli() -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn")?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn env_filter(fallback: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback).map_err(|source| TelemetryError::EnvFilter {
            value: fallback.to_string(),
            source,
        }),
    }
}
