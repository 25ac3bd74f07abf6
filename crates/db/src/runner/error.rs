//! Migration runner error types.

use hallmark_shared::ConfigError;
use sea_orm::DbErr;
use thiserror::Error;

/// Result type alias using `MigrationError`.
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Errors surfaced by a migration run.
///
/// None of these are recovered locally; database errors are carried unchanged.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required configuration is missing or invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The database connection could not be established or released.
    #[error("database connection failed: {0}")]
    Connection(#[source] DbErr),

    /// A statement failed while migrations were running.
    #[error("migration failed: {0}")]
    Execution(#[from] DbErr),

    /// Two revisions share the same id.
    #[error("conflicting revisions: '{0}' is defined more than once")]
    RevisionConflict(String),

    /// A revision id is recorded or requested but not defined.
    #[error("unknown revision: '{0}'")]
    UnknownRevision(String),

    /// The operation needs a live database.
    #[error("'{0}' is not supported in offline mode")]
    OfflineUnsupported(&'static str),

    /// Writing the SQL script failed.
    #[error("failed to write migration script: {0}")]
    Script(#[from] std::io::Error),
}

impl MigrationError {
    /// Create an unknown revision error.
    #[must_use]
    pub fn unknown_revision(id: impl Into<String>) -> Self {
        Self::UnknownRevision(id.into())
    }
}
