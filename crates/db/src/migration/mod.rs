//! Database migrations.
//!
//! Revisions describe their changes as sea-query statements rather than
//! executing them, so the same revision can be applied to a live database or
//! rendered into a SQL script.

use std::collections::HashSet;

use sea_orm::DbBackend;
pub use sea_orm_migration::MigrationName;

use crate::metadata::SchemaMetadata;
use crate::runner::MigrationError;

mod change;
pub mod version;

mod m20250101_000001_create_report_tables;
mod m20250101_000002_report_lookup_indexes;

pub use change::SchemaChange;

/// What a revision gets to look at while producing its changes.
#[derive(Debug, Clone, Copy)]
pub struct RevisionContext<'a> {
    /// Dialect the changes will be built for.
    pub backend: DbBackend,
    /// Schema metadata bound for this run.
    pub metadata: &'a SchemaMetadata,
}

/// One ordered migration step.
///
/// The id is the [`MigrationName`], normally derived from the file name with
/// `#[derive(DeriveMigrationName)]`.
pub trait Revision: MigrationName + Send + Sync {
    /// Changes that apply this revision.
    fn up(&self, ctx: &RevisionContext<'_>) -> Vec<SchemaChange>;

    /// Changes that undo this revision.
    fn down(&self, ctx: &RevisionContext<'_>) -> Vec<SchemaChange>;
}

/// All revisions, oldest first.
#[must_use]
pub fn revisions() -> Vec<Box<dyn Revision>> {
    vec![
        Box::new(m20250101_000001_create_report_tables::Migration),
        Box::new(m20250101_000002_report_lookup_indexes::Migration),
    ]
}

/// Rejects revision lists that define the same id twice.
pub fn check_revisions(revisions: &[Box<dyn Revision>]) -> Result<(), MigrationError> {
    let mut seen = HashSet::with_capacity(revisions.len());
    for revision in revisions {
        if !seen.insert(revision.name()) {
            return Err(MigrationError::RevisionConflict(revision.name().to_owned()));
        }
    }
    Ok(())
}

/// Finds the position of a revision by id.
pub fn position(revisions: &[Box<dyn Revision>], id: &str) -> Option<usize> {
    revisions.iter().position(|revision| revision.name() == id)
}
