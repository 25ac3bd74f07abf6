//! Shared helpers for runner integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hallmark_db::migration::{MigrationName, Revision, RevisionContext, SchemaChange};
use hallmark_db::runner::{ConnectRequest, Connector, SeaOrmConnector};
use hallmark_shared::MigrationConfig;
use sea_orm::{DatabaseConnection, DbErr};

/// Fixed `applied_at` so scripts are comparable.
pub const TIMESTAMP: i64 = 1_735_689_600;

/// Opens a separate connection for inspecting what a run left behind.
pub async fn inspect(url: &str) -> DatabaseConnection {
    SeaOrmConnector
        .connect(ConnectRequest::unpooled(url))
        .await
        .expect("inspection connection")
}

/// Builds a config from a literal URL.
pub fn config(url: &str) -> MigrationConfig {
    let url = url.to_string();
    MigrationConfig::from_lookup(move |_| Some(url.clone())).expect("valid config")
}

/// Connector that records every attempt and keeps a handle on the last connection.
#[derive(Default)]
pub struct RecordingConnector {
    attempts: AtomicUsize,
    requests: Mutex<Vec<ConnectRequest>>,
    last: Mutex<Option<DatabaseConnection>>,
}

impl RecordingConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ConnectRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// A clone of the last connection handed out; it shares the pool, so it
    /// observes whether the runner closed it.
    pub fn last_connection(&self) -> Option<DatabaseConnection> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<DatabaseConnection, DbErr> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let conn = SeaOrmConnector.connect(request).await?;
        *self.last.lock().unwrap() = Some(conn.clone());
        Ok(conn)
    }
}

/// A revision whose only statement is invalid SQL.
pub struct BrokenRevision;

impl MigrationName for BrokenRevision {
    fn name(&self) -> &str {
        "m20250101_000003_broken"
    }
}

impl Revision for BrokenRevision {
    fn up(&self, _ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        vec![SchemaChange::Raw("CREATE TABLE broken (".to_string())]
    }

    fn down(&self, _ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        Vec::new()
    }
}
