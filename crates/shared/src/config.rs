//! Migration configuration management.
//!
//! Configuration is resolved once at process start into a [`MigrationConfig`]
//! and handed by reference to whatever needs it.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the database connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Loads variables from a local `.env` file into the process environment.
///
/// Uses dotenvy's discovery (current directory, then parents). A missing file
/// is not an error and yields `Ok(None)`; variables already set in the
/// environment take precedence over the file.
///
/// # Errors
///
/// Returns an error if a `.env` file exists but cannot be read or parsed.
pub fn load_env_file() -> ConfigResult<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Ok(Some(path))
        }
        Err(err) if err.not_found() => {
            debug!("No .env file found, using process environment");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Resolved configuration for a migration run.
///
/// Cannot be built without a non-empty database URL.
#[derive(Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    database_url: String,
}

impl MigrationConfig {
    /// Resolves configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if `DATABASE_URL` is absent or empty.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if `DATABASE_URL` is absent or empty.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(DATABASE_URL_VAR) {
            Some(url) if !url.is_empty() => Ok(Self { database_url: url }),
            _ => Err(ConfigError::missing_var(DATABASE_URL_VAR)),
        }
    }

    /// Returns the database URL exactly as it was resolved.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the URL scheme (the part before the first `:`), lowercased.
    #[must_use]
    pub fn scheme(&self) -> String {
        url_scheme(&self.database_url)
    }
}

// Credentials in the URL must never reach the logs.
impl std::fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("database_url", &redact_url(&self.database_url))
            .finish()
    }
}

/// Returns the lowercased scheme of a connection URL.
#[must_use]
pub fn url_scheme(url: &str) -> String {
    url.split_once(':')
        .map_or(url, |(scheme, _)| scheme)
        .to_ascii_lowercase()
}

/// Masks the password component of a connection URL.
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, tail) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    match authority.rsplit_once('@') {
        Some((userinfo, host)) => match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}{tail}"),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
