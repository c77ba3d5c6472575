use thiserror::Error;
use tracing_subscriber::{filter::ParseError, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
  #[error("invalid log level/filter '{value}': {source}")]
  EnvFilter { value: String, source: ParseError },

  #[error("telemetry error: {0}")]
  Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(log_level: &str) -> Result<(), TelemetryError> {
  let env_filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(log_level).map_err(|source| {
      TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
      }
    })?,
  };

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .compact()
    .try_init()
    .map_err(TelemetryError::Subscriber)
}
