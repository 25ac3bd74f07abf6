//! Migration context and transaction scope.
//!
//! A [`MigrationContext`] targets either a SQL script (offline) or a live
//! connection (online). Migrations always run inside a
//! [`MigrationTransaction`]; dropping one without committing abandons the work
//! (a database transaction rolls back, a script gets no `COMMIT`).

use std::collections::HashMap;
use std::io::Write;

use chrono::Utc;
use hallmark_shared::{ConfigError, config::url_scheme};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, Statement,
    TransactionTrait,
};
use sea_orm_migration::MigrationName;
use tracing::{debug, info};

use super::error::{MigrationError, MigrationResult};
use super::render::{ParamStyle, render_statement};
use crate::metadata::SchemaMetadata;
use crate::migration::{self, Revision, RevisionContext, version};

/// Options fixed when a context is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Inline bound values as SQL literals in scripts.
    pub literal_binds: bool,
    /// Placeholder style for scripts when values are not inlined.
    pub param_style: ParamStyle,
    /// Fixed `applied_at` for version records. When unset, online runs use the
    /// current time and scripts use the database clock at apply time.
    pub timestamp: Option<i64>,
    /// Offline only: treat revisions up to and including this id as applied.
    pub start_after: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            literal_binds: false,
            param_style: ParamStyle::Named,
            timestamp: None,
            start_after: None,
        }
    }
}

impl ContextOptions {
    /// Options for script generation: literal binds, named paramstyle.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            literal_binds: true,
            param_style: ParamStyle::Named,
            ..Self::default()
        }
    }

    fn applied_at(&self) -> i64 {
        self.timestamp.unwrap_or_else(|| Utc::now().timestamp())
    }
}

/// Maps a connection URL to the SQL dialect used for rendering.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedScheme`] for unknown schemes.
pub fn backend_for_url(url: &str) -> Result<DbBackend, ConfigError> {
    match url_scheme(url).as_str() {
        "postgres" | "postgresql" => Ok(DbBackend::Postgres),
        "mysql" | "mariadb" => Ok(DbBackend::MySql),
        "sqlite" => Ok(DbBackend::Sqlite),
        other => Err(ConfigError::unsupported_scheme(other)),
    }
}

enum Target<'c> {
    Script {
        backend: DbBackend,
        out: &'c mut dyn Write,
    },
    Connection(&'c DatabaseConnection),
}

/// A configured migration context.
pub struct MigrationContext<'c> {
    target: Target<'c>,
    metadata: &'c SchemaMetadata,
    options: ContextOptions,
}

impl<'c> MigrationContext<'c> {
    /// Configures a context that renders SQL for `url`'s dialect into `out`.
    ///
    /// No connection is opened.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL scheme has no known dialect.
    pub fn offline(
        url: &str,
        metadata: &'c SchemaMetadata,
        options: ContextOptions,
        out: &'c mut dyn Write,
    ) -> MigrationResult<Self> {
        let backend = backend_for_url(url)?;
        debug!(
            dialect = backend_name(backend),
            literal_binds = options.literal_binds,
            param_style = %options.param_style,
            "Configured offline context"
        );
        Ok(Self {
            target: Target::Script { backend, out },
            metadata,
            options,
        })
    }

    /// Configures a context bound to a live connection.
    #[must_use]
    pub fn online(
        conn: &'c DatabaseConnection,
        metadata: &'c SchemaMetadata,
        options: ContextOptions,
    ) -> Self {
        Self {
            target: Target::Connection(conn),
            metadata,
            options,
        }
    }

    /// Whether this context renders a script.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(self.target, Target::Script { .. })
    }

    /// Dialect statements are built for.
    #[must_use]
    pub fn backend(&self) -> DbBackend {
        match &self.target {
            Target::Script { backend, .. } => *backend,
            Target::Connection(conn) => conn.get_database_backend(),
        }
    }

    /// Options the context was configured with.
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Schema metadata bound to the context.
    #[must_use]
    pub const fn metadata(&self) -> &'c SchemaMetadata {
        self.metadata
    }

    /// Opens the transaction scope migrations run in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction cannot be started or the
    /// script cannot be written.
    pub async fn begin_transaction(&mut self) -> MigrationResult<MigrationTransaction<'_>> {
        let backend = self.backend();
        let metadata = self.metadata;
        let scope = match &mut self.target {
            Target::Script { out, .. } => {
                let tables: Vec<&str> = metadata.table_names().collect();
                writeln!(out, "-- Hallmark migration script")?;
                writeln!(out, "-- Dialect: {}", backend_name(backend))?;
                writeln!(out, "-- Target tables: {}", tables.join(", "))?;
                writeln!(out)?;
                write!(out, "BEGIN;\n\n")?;
                Scope::Script { out: &mut **out }
            }
            Target::Connection(conn) => {
                Scope::Database(conn.begin().await.map_err(MigrationError::Connection)?)
            }
        };

        Ok(MigrationTransaction {
            scope,
            backend,
            metadata,
            options: &self.options,
        })
    }
}

enum Scope<'t> {
    Script { out: &'t mut dyn Write },
    Database(DatabaseTransaction),
}

/// Applied state of one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionStatus {
    /// Revision id.
    pub id: String,
    /// When it was applied, in unix seconds; `None` while pending.
    pub applied_at: Option<i64>,
}

impl RevisionStatus {
    /// Whether the revision has been applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Transaction scope for a migration run.
pub struct MigrationTransaction<'t> {
    scope: Scope<'t>,
    backend: DbBackend,
    metadata: &'t SchemaMetadata,
    options: &'t ContextOptions,
}

impl MigrationTransaction<'_> {
    /// Runs every pending revision in order and returns the ids applied.
    ///
    /// Online, pending means not yet recorded in the version table. Offline,
    /// every revision after `start_after` is pending.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error unchanged; nothing is
    /// committed.
    pub async fn run_migrations(
        &mut self,
        revisions: &[Box<dyn Revision>],
    ) -> MigrationResult<Vec<String>> {
        migration::check_revisions(revisions)?;
        self.execute(version::create_table(self.backend)).await?;

        let (mut previous, pending) = self.pending(revisions).await?;
        if pending.is_empty() {
            info!("No pending migrations");
            return Ok(Vec::new());
        }

        let ctx = RevisionContext {
            backend: self.backend,
            metadata: self.metadata,
        };
        let applied_at = self.recorded_at();
        let mut applied = Vec::with_capacity(pending.len());

        for index in pending {
            let revision = &revisions[index];
            let id = revision.name();
            info!(revision = id, "Running upgrade");
            self.comment(&format!(
                "Running upgrade {} -> {id}",
                previous.as_deref().unwrap_or("<base>")
            ))?;

            for change in revision.up(&ctx) {
                self.execute(change.build(self.backend)).await?;
            }
            self.execute(version::insert(self.backend, id, applied_at))
                .await?;

            previous = Some(id.to_owned());
            applied.push(id.to_owned());
        }

        Ok(applied)
    }

    /// Undoes the last `steps` applied revisions, newest first.
    ///
    /// # Errors
    ///
    /// Fails offline, when a recorded revision is not defined, or when a
    /// statement fails.
    pub async fn revert(
        &mut self,
        revisions: &[Box<dyn Revision>],
        steps: u32,
    ) -> MigrationResult<Vec<String>> {
        migration::check_revisions(revisions)?;
        let Scope::Database(txn) = &self.scope else {
            return Err(MigrationError::OfflineUnsupported("down"));
        };

        txn.execute(version::create_table(self.backend)).await?;
        let records = version::applied(txn).await?;
        let ctx = RevisionContext {
            backend: self.backend,
            metadata: self.metadata,
        };

        let mut reverted = Vec::new();
        for record in records.iter().rev().take(steps as usize) {
            let index = migration::position(revisions, &record.version)
                .ok_or_else(|| MigrationError::unknown_revision(&record.version))?;
            info!(revision = %record.version, "Running downgrade");

            for change in revisions[index].down(&ctx) {
                self.execute(change.build(self.backend)).await?;
            }
            self.execute(version::delete(self.backend, &record.version))
                .await?;
            reverted.push(record.version.clone());
        }

        if reverted.is_empty() {
            info!("No applied migrations to revert");
        }
        Ok(reverted)
    }

    /// Reports applied/pending state for every revision.
    ///
    /// # Errors
    ///
    /// Fails offline or when the version table cannot be read.
    pub async fn status(
        &self,
        revisions: &[Box<dyn Revision>],
    ) -> MigrationResult<Vec<RevisionStatus>> {
        let Scope::Database(txn) = &self.scope else {
            return Err(MigrationError::OfflineUnsupported("status"));
        };

        txn.execute(version::create_table(self.backend)).await?;
        let applied: HashMap<String, i64> = version::applied(txn)
            .await?
            .into_iter()
            .map(|record| (record.version, record.applied_at))
            .collect();

        Ok(revisions
            .iter()
            .map(|revision| RevisionStatus {
                id: revision.name().to_owned(),
                applied_at: applied.get(revision.name()).copied(),
            })
            .collect())
    }

    /// Commits the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> MigrationResult<()> {
        match self.scope {
            Scope::Script { out } => {
                writeln!(out, "COMMIT;")?;
                out.flush()?;
            }
            Scope::Database(txn) => txn.commit().await?,
        }
        Ok(())
    }

    /// Returns the last applied id (if any) and the indexes of pending revisions.
    async fn pending(
        &self,
        revisions: &[Box<dyn Revision>],
    ) -> MigrationResult<(Option<String>, Vec<usize>)> {
        match &self.scope {
            Scope::Script { .. } => {
                let start = match self.options.start_after.as_deref() {
                    Some(id) => migration::position(revisions, id)
                        .map(|index| index + 1)
                        .ok_or_else(|| MigrationError::unknown_revision(id))?,
                    None => 0,
                };
                Ok((self.options.start_after.clone(), (start..revisions.len()).collect()))
            }
            Scope::Database(txn) => {
                let records = version::applied(txn).await?;
                if let Some(unknown) = records
                    .iter()
                    .find(|record| migration::position(revisions, &record.version).is_none())
                {
                    return Err(MigrationError::unknown_revision(&unknown.version));
                }
                let previous = records.last().map(|record| record.version.clone());
                let pending = revisions
                    .iter()
                    .enumerate()
                    .filter(|(_, revision)| {
                        !records.iter().any(|record| record.version == revision.name())
                    })
                    .map(|(index, _)| index)
                    .collect();
                Ok((previous, pending))
            }
        }
    }

    async fn execute(&mut self, stmt: Statement) -> MigrationResult<()> {
        match &mut self.scope {
            Scope::Script { out } => {
                let sql =
                    render_statement(&stmt, self.options.literal_binds, self.options.param_style);
                out.write_all(sql.as_bytes())?;
            }
            Scope::Database(txn) => {
                debug!(sql = %stmt, "Executing");
                txn.execute(stmt).await?;
            }
        }
        Ok(())
    }

    /// Scripts leave an unpinned `applied_at` to the database clock.
    fn recorded_at(&self) -> Option<i64> {
        match self.scope {
            Scope::Script { .. } => self.options.timestamp,
            Scope::Database(_) => Some(self.options.applied_at()),
        }
    }

    fn comment(&mut self, text: &str) -> MigrationResult<()> {
        if let Scope::Script { out } = &mut self.scope {
            write!(out, "-- {text}\n\n")?;
        }
        Ok(())
    }
}

fn backend_name(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Postgres => "postgresql",
        DbBackend::MySql => "mysql",
        DbBackend::Sqlite => "sqlite",
    }
}
