//! Lookup indexes for the report search screens.

use sea_orm_migration::prelude::*;

use super::{Revision, RevisionContext, SchemaChange};

const INDEXES: [(&str, &str); 2] = [
    ("idx_reports_style_number", "style_number"),
    ("idx_reports_report_date", "report_date"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

impl Revision for Migration {
    fn up(&self, _ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        INDEXES
            .iter()
            .map(|(name, column)| {
                Index::create()
                    .name(*name)
                    .table(Alias::new("reports"))
                    .col(Alias::new(*column))
                    .to_owned()
                    .into()
            })
            .collect()
    }

    fn down(&self, _ctx: &RevisionContext<'_>) -> Vec<SchemaChange> {
        INDEXES
            .iter()
            .map(|(name, _)| {
                Index::drop()
                    .name(*name)
                    .table(Alias::new("reports"))
                    .to_owned()
                    .into()
            })
            .collect()
    }
}
