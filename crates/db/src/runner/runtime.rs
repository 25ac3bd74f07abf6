//! The migration runtime: mode flag, shared options, and collaborators.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::info;

use super::connector::{ConnectRequest, ConnectionGuard, Connector, SeaOrmConnector};
use super::error::{MigrationError, MigrationResult};
use crate::migration::{self, Revision};

/// Main option key holding the database URL.
pub const URL_KEY: &str = "database.url";

/// How migrations are executed for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    /// Render SQL without a database connection.
    Offline,
    /// Apply over a live connection.
    Online,
}

impl MigrationMode {
    /// Picks the mode from a "generate SQL" flag.
    #[must_use]
    pub const fn from_sql_flag(sql: bool) -> Self {
        if sql { Self::Offline } else { Self::Online }
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("offline"),
            Self::Online => f.write_str("online"),
        }
    }
}

/// Shared key-value configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainOptions {
    values: BTreeMap<String, String>,
}

impl MainOptions {
    /// Sets an option, replacing any previous value.
    pub fn set_main_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Reads an option.
    #[must_use]
    pub fn main_option(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Runtime state for one migrator invocation.
///
/// `W` receives offline scripts; it is stdout unless replaced.
pub struct MigrationRuntime<W = io::Stdout> {
    mode: MigrationMode,
    options: MainOptions,
    revisions: Vec<Box<dyn Revision>>,
    connector: Arc<dyn Connector>,
    output: W,
    timestamp: Option<i64>,
    start_after: Option<String>,
}

impl MigrationRuntime {
    /// Runtime with the crate's revisions, the `SeaORM` connector, and stdout.
    #[must_use]
    pub fn new(mode: MigrationMode) -> Self {
        Self {
            mode,
            options: MainOptions::default(),
            revisions: migration::revisions(),
            connector: Arc::new(SeaOrmConnector),
            output: io::stdout(),
            timestamp: None,
            start_after: None,
        }
    }
}

impl<W: Write> MigrationRuntime<W> {
    /// Sends offline scripts to another writer.
    #[must_use]
    pub fn with_output<O: Write>(self, output: O) -> MigrationRuntime<O> {
        MigrationRuntime {
            mode: self.mode,
            options: self.options,
            revisions: self.revisions,
            connector: self.connector,
            output,
            timestamp: self.timestamp,
            start_after: self.start_after,
        }
    }

    /// Replaces the revision list.
    #[must_use]
    pub fn with_revisions(mut self, revisions: Vec<Box<dyn Revision>>) -> Self {
        self.revisions = revisions;
        self
    }

    /// Replaces the connector.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Pins `applied_at` for version records.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Offline only: start the script after this revision.
    #[must_use]
    pub fn with_start_after(mut self, revision: impl Into<String>) -> Self {
        self.start_after = Some(revision.into());
        self
    }

    /// The mode flag.
    #[must_use]
    pub const fn mode(&self) -> MigrationMode {
        self.mode
    }

    /// Whether this invocation renders SQL instead of touching a database.
    #[must_use]
    pub const fn is_offline_mode(&self) -> bool {
        matches!(self.mode, MigrationMode::Offline)
    }

    /// Shared options.
    #[must_use]
    pub const fn options(&self) -> &MainOptions {
        &self.options
    }

    /// Shared options, mutably.
    pub fn options_mut(&mut self) -> &mut MainOptions {
        &mut self.options
    }

    /// Revisions, oldest first.
    #[must_use]
    pub fn revisions(&self) -> &[Box<dyn Revision>] {
        &self.revisions
    }

    /// Script output.
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Consumes the runtime, returning the script output.
    pub fn into_output(self) -> W {
        self.output
    }

    pub(crate) const fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    pub(crate) fn start_after(&self) -> Option<&str> {
        self.start_after.as_deref()
    }

    /// Revisions and script output, borrowed together.
    pub(crate) fn script_parts(&mut self) -> (&[Box<dyn Revision>], &mut W) {
        (&self.revisions, &mut self.output)
    }

    /// Opens the single, unpooled migration connection.
    pub(crate) async fn connect(&self, url: &str) -> MigrationResult<ConnectionGuard> {
        let request = ConnectRequest::unpooled(url);
        let conn = self
            .connector
            .connect(request)
            .await
            .map_err(MigrationError::Connection)?;
        info!("Connected to database");
        Ok(ConnectionGuard::new(conn))
    }
}
