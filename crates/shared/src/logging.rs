//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ConfigResult;
use crate::settings::{LogFormat, LoggingConfig};

/// Installs the global tracing subscriber.
///
/// Output goes to stderr so that SQL scripts written to stdout stay clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> ConfigResult<()> {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured directive; an invalid configured
/// directive falls back to `info`.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_applies_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let config = LoggingConfig {
                filter: "debug".to_string(),
                format: LogFormat::Pretty,
            };
            assert_eq!(build_filter(&config).to_string(), "debug");
        });
    }

    #[test]
    fn test_rust_log_overrides_configured_filter() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let config = LoggingConfig::default();
            assert_eq!(build_filter(&config).to_string(), "warn");
        });
    }
}
