//! Initial schema: grading reports and back-office admins.
//!
//! Tables are created from the bound schema metadata.

use sea_orm_migration::prelude::*;

use super::{Revision, RevisionContext, SchemaChange};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl Revision for Migration {
    fn up(&self, ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        ctx.metadata
            .create_statements(ctx.backend)
            .into_iter()
            .map(SchemaChange::from)
            .collect()
    }

    fn down(&self, ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        ctx.metadata
            .tables()
            .iter()
            .rev()
            .map(|table| {
                Table::drop()
                    .table(Alias::new(table.name()))
                    .if_exists()
                    .to_owned()
                    .into()
            })
            .collect()
    }
}
