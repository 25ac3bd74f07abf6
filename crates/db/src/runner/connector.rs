//! Database connection establishment for online runs.

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use tracing::{debug, warn};

/// Parameters for opening the migration connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Connection URL, unchanged from configuration.
    pub url: String,
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
}

impl ConnectRequest {
    /// A request for a single fresh connection that is never shared or kept idle.
    #[must_use]
    pub fn unpooled(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 1,
            min_connections: 0,
        }
    }

    /// Whether the request disables pooling.
    #[must_use]
    pub const fn is_unpooled(&self) -> bool {
        self.max_connections == 1 && self.min_connections == 0
    }

    /// Converts into `SeaORM` connect options.
    #[must_use]
    pub fn into_options(self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url);
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .sqlx_logging(false);
        options
    }
}

/// Opens database connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a connection. Failures are returned as-is, never retried.
    async fn connect(&self, request: ConnectRequest) -> Result<DatabaseConnection, DbErr>;
}

/// Connects through `SeaORM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmConnector;

#[async_trait]
impl Connector for SeaOrmConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<DatabaseConnection, DbErr> {
        Database::connect(request.into_options()).await
    }
}

/// Owns the migration connection until it is released.
///
/// [`ConnectionGuard::release`] closes the connection and may be called any
/// number of times.
#[derive(Debug)]
pub struct ConnectionGuard {
    conn: Option<DatabaseConnection>,
}

impl ConnectionGuard {
    /// Wraps an open connection.
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn: Some(conn) }
    }

    /// Borrows the connection.
    ///
    /// # Errors
    ///
    /// Returns an error once the connection has been released.
    pub fn connection(&self) -> Result<&DatabaseConnection, DbErr> {
        self.conn
            .as_ref()
            .ok_or_else(|| DbErr::Conn(RuntimeErr::Internal("connection already released".into())))
    }

    /// Whether the connection has been released.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.conn.is_none()
    }

    /// Closes the connection. Subsequent calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if closing the underlying connection fails.
    pub async fn release(&mut self) -> Result<(), DbErr> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().await?;
                debug!("Database connection released");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.conn.is_some() {
            warn!("Database connection dropped without release");
        }
    }
}
