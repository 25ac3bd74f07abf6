//! Shared configuration, logging, and errors for Hallmark.
//!
//! This crate provides the ambient pieces every Hallmark binary needs:
//! - `.env` bootstrap and database URL resolution
//! - Optional settings file with environment overrides
//! - Tracing subscriber setup
//! - Configuration error types

pub mod config;
pub mod error;
pub mod logging;
pub mod settings;

pub use config::{DATABASE_URL_VAR, MigrationConfig, load_env_file};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_tracing;
pub use settings::{LogFormat, LoggingConfig, Settings};
