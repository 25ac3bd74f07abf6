//! Configuration error types.

use thiserror::Error;

/// Result type alias using `ConfigError`.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while bootstrapping configuration.
///
/// All of these are fatal: the migrator must not proceed past any of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{name} is missing in environment or .env file")]
    MissingVar {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// The database URL scheme does not map to a supported SQL dialect.
    #[error("unsupported database url scheme: '{0}'")]
    UnsupportedScheme(String),

    /// The `.env` file exists but could not be read or parsed.
    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// The settings file or its environment overlay is invalid.
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// A global tracing subscriber was already installed.
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

impl ConfigError {
    /// Create a missing variable error.
    #[must_use]
    pub const fn missing_var(name: &'static str) -> Self {
        Self::MissingVar { name }
    }

    /// Create an unsupported scheme error.
    #[must_use]
    pub fn unsupported_scheme(scheme: impl Into<String>) -> Self {
        Self::UnsupportedScheme(scheme.into())
    }
}
