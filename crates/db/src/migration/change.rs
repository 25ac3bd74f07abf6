//! Backend-agnostic schema changes produced by revisions.

use sea_orm::{DbBackend, Statement};
use sea_orm_migration::prelude::*;

/// A single schema change.
///
/// Changes are built into backend-specific [`Statement`]s only when they are
/// executed or rendered, so one revision serves every dialect.
#[derive(Debug, Clone)]
pub enum SchemaChange {
    /// `CREATE TABLE`.
    CreateTable(TableCreateStatement),
    /// `DROP TABLE`.
    DropTable(TableDropStatement),
    /// `CREATE INDEX`.
    CreateIndex(IndexCreateStatement),
    /// `DROP INDEX`.
    DropIndex(IndexDropStatement),
    /// Literal SQL, passed through untouched.
    Raw(String),
}

impl SchemaChange {
    /// Builds the statement for a backend.
    #[must_use]
    pub fn build(&self, backend: DbBackend) -> Statement {
        match self {
            Self::CreateTable(stmt) => backend.build(stmt),
            Self::DropTable(stmt) => backend.build(stmt),
            Self::CreateIndex(stmt) => backend.build(stmt),
            Self::DropIndex(stmt) => backend.build(stmt),
            Self::Raw(sql) => Statement::from_string(backend, sql.clone()),
        }
    }
}

impl From<TableCreateStatement> for SchemaChange {
    fn from(stmt: TableCreateStatement) -> Self {
        Self::CreateTable(stmt)
    }
}

impl From<TableDropStatement> for SchemaChange {
    fn from(stmt: TableDropStatement) -> Self {
        Self::DropTable(stmt)
    }
}

impl From<IndexCreateStatement> for SchemaChange {
    fn from(stmt: IndexCreateStatement) -> Self {
        Self::CreateIndex(stmt)
    }
}

impl From<IndexDropStatement> for SchemaChange {
    fn from(stmt: IndexDropStatement) -> Self {
        Self::DropIndex(stmt)
    }
}
