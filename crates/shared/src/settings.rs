//! Optional settings file for the migrator.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigResult;

/// Default settings file, looked up relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "migrator";

/// Migrator settings.
///
/// Every field has a default, so a missing file yields a usable value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_filter() -> String {
    "info,sqlx=warn".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Settings {
    /// Loads settings from an optional file plus `HALLMARK__*` environment overrides.
    ///
    /// With no explicit path, `migrator.{toml,json,yaml,...}` in the working
    /// directory is used if present. An explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any settings file is
    /// invalid.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("HALLMARK").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
