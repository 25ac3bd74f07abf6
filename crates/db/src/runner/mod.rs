//! Migration runner.
//!
//! [`run`] is the entry point the migrator binary drives:
//!
//! 1. the resolved [`MigrationConfig`] URL is written into the runtime's main
//!    options under [`URL_KEY`], unchanged;
//! 2. the runtime's [`MigrationMode`] selects the path:
//!    - **offline**: a script context is configured from the URL and the
//!      metadata alone (literal binds, named paramstyle) and pending revisions
//!      are rendered inside `BEGIN`/`COMMIT`;
//!    - **online**: one unpooled connection is opened, pending revisions are
//!      applied inside a database transaction, and the connection is released
//!      on every exit path.
//!
//! Errors are never retried or recovered here.

mod connector;
mod context;
mod error;
mod render;
mod runtime;

use std::io::Write;

use hallmark_shared::{ConfigError, DATABASE_URL_VAR, MigrationConfig, config::redact_url};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

pub use connector::{ConnectRequest, ConnectionGuard, Connector, SeaOrmConnector};
pub use context::{
    ContextOptions, MigrationContext, MigrationTransaction, RevisionStatus, backend_for_url,
};
pub use error::{MigrationError, MigrationResult};
pub use render::{ParamStyle, render_statement};
pub use runtime::{MainOptions, MigrationMode, MigrationRuntime, URL_KEY};

use crate::metadata::SchemaMetadata;

/// Outcome of a migrator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Mode the command ran in.
    pub mode: MigrationMode,
    /// Revisions applied, rendered, or reverted, in execution order.
    pub revisions: Vec<String>,
}

/// Runs all pending migrations in the runtime's mode.
///
/// # Errors
///
/// - [`MigrationError::Configuration`] when the URL has no usable dialect (offline)
/// - [`MigrationError::Connection`] when the connection cannot be opened (online)
/// - [`MigrationError::Execution`] when a revision fails; nothing is committed
pub async fn run<W: Write>(
    config: &MigrationConfig,
    metadata: &SchemaMetadata,
    runtime: &mut MigrationRuntime<W>,
) -> MigrationResult<RunReport> {
    bind_url(config, runtime);
    let mode = runtime.mode();
    info!(%mode, tables = metadata.len(), "Running migrations");

    let revisions = match mode {
        MigrationMode::Offline => run_migrations_offline(metadata, runtime).await?,
        MigrationMode::Online => run_migrations_online(metadata, runtime).await?,
    };

    info!(%mode, count = revisions.len(), "Migrations complete");
    Ok(RunReport { mode, revisions })
}

/// Reverts the last `steps` applied revisions. Online only.
///
/// # Errors
///
/// Fails in offline mode, on connection failure, or when a revision fails.
pub async fn downgrade<W: Write>(
    config: &MigrationConfig,
    metadata: &SchemaMetadata,
    runtime: &mut MigrationRuntime<W>,
    steps: u32,
) -> MigrationResult<RunReport> {
    bind_url(config, runtime);
    if runtime.is_offline_mode() {
        return Err(MigrationError::OfflineUnsupported("down"));
    }

    let options = online_options(runtime);
    let revisions = with_connection(runtime, async |conn| {
        let mut context = MigrationContext::online(conn, metadata, options);
        let mut txn = context.begin_transaction().await?;
        let reverted = txn.revert(runtime.revisions(), steps).await?;
        txn.commit().await?;
        Ok(reverted)
    })
    .await?;

    Ok(RunReport {
        mode: MigrationMode::Online,
        revisions,
    })
}

/// Lists every revision with its applied state. Online only.
///
/// # Errors
///
/// Fails in offline mode, on connection failure, or when the version table
/// cannot be read.
pub async fn status<W: Write>(
    config: &MigrationConfig,
    metadata: &SchemaMetadata,
    runtime: &mut MigrationRuntime<W>,
) -> MigrationResult<Vec<RevisionStatus>> {
    bind_url(config, runtime);
    if runtime.is_offline_mode() {
        return Err(MigrationError::OfflineUnsupported("status"));
    }

    let options = online_options(runtime);
    with_connection(runtime, async |conn| {
        let mut context = MigrationContext::online(conn, metadata, options);
        let txn = context.begin_transaction().await?;
        let statuses = txn.status(runtime.revisions()).await?;
        txn.commit().await?;
        Ok(statuses)
    })
    .await
}

fn bind_url<W: Write>(config: &MigrationConfig, runtime: &mut MigrationRuntime<W>) {
    runtime
        .options_mut()
        .set_main_option(URL_KEY, config.database_url());
}

fn bound_url<W: Write>(runtime: &MigrationRuntime<W>) -> MigrationResult<String> {
    runtime
        .options()
        .main_option(URL_KEY)
        .map(str::to_owned)
        .ok_or_else(|| ConfigError::missing_var(DATABASE_URL_VAR).into())
}

fn online_options<W: Write>(runtime: &MigrationRuntime<W>) -> ContextOptions {
    ContextOptions {
        timestamp: runtime.timestamp(),
        ..ContextOptions::default()
    }
}

async fn run_migrations_offline<W: Write>(
    metadata: &SchemaMetadata,
    runtime: &mut MigrationRuntime<W>,
) -> MigrationResult<Vec<String>> {
    let url = bound_url(runtime)?;
    let options = ContextOptions {
        timestamp: runtime.timestamp(),
        start_after: runtime.start_after().map(str::to_owned),
        ..ContextOptions::offline()
    };

    let (revisions, output) = runtime.script_parts();
    let mut context = MigrationContext::offline(&url, metadata, options, output)?;
    let mut txn = context.begin_transaction().await?;
    let rendered = txn.run_migrations(revisions).await?;
    txn.commit().await?;
    Ok(rendered)
}

async fn run_migrations_online<W: Write>(
    metadata: &SchemaMetadata,
    runtime: &mut MigrationRuntime<W>,
) -> MigrationResult<Vec<String>> {
    let options = online_options(runtime);
    with_connection(runtime, async |conn| {
        let mut context = MigrationContext::online(conn, metadata, options);
        let mut txn = context.begin_transaction().await?;
        let applied = txn.run_migrations(runtime.revisions()).await?;
        txn.commit().await?;
        Ok(applied)
    })
    .await
}

/// Opens the migration connection, runs `f`, and releases the connection
/// whether or not `f` succeeded. `f`'s error wins over a release error.
async fn with_connection<W, T, F>(runtime: &MigrationRuntime<W>, f: F) -> MigrationResult<T>
where
    W: Write,
    F: AsyncFnOnce(&DatabaseConnection) -> MigrationResult<T>,
{
    let url = bound_url(runtime)?;
    info!(url = %redact_url(&url), "Connecting to database");
    let mut guard = runtime.connect(&url).await?;

    let result = match guard.connection() {
        Ok(conn) => f(conn).await,
        Err(err) => Err(MigrationError::Connection(err)),
    };

    match guard.release().await {
        Ok(()) => result,
        Err(err) if result.is_ok() => Err(MigrationError::Connection(err)),
        Err(err) => {
            warn!(error = %err, "Failed to release connection after failed run");
            result
        }
    }
}
