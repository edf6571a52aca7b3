//! Observability.
//!
//! The library only emits `tracing` events; the hosting application decides
//! where they go. [`init`] installs a `tracing-subscriber` registry for hosts
//! that do not bring their own.

mod logging;

pub use logging::{DEFAULT_FILTER, LogFormat, LoggingConfig};

use crate::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes logging from `RUST_LOG` / `RIVALGRAPH_LOG` / `RIVALGRAPH_LOG_FORMAT`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    init(&LoggingConfig::from_env())
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init()
            .map_err(init_error),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(init_error),
    }
}

/// Helper to convert init errors.
#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::new()
            .with_format(LogFormat::Json)
            .with_filter("warn");
        let _ = init(&config);
        assert!(matches!(
            init(&config),
            Err(Error::OperationFailed { .. })
        ));
    }
}
