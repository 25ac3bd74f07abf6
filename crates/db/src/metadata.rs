//! Schema metadata: the structural description of the model layer's tables.
//!
//! The model layer owns a single [`SchemaMetadata`] for the life of the
//! process (see [`crate::entities::metadata`]). Everything else borrows it.

use sea_orm::{DbBackend, EntityName, EntityTrait, IdenStatic, Iterable, Schema};
use sea_orm_migration::prelude::TableCreateStatement;

/// One table known to the model layer.
#[derive(Debug)]
pub struct TableDef {
    name: String,
    columns: Vec<String>,
    create: fn(&Schema) -> TableCreateStatement,
}

impl TableDef {
    /// Describes the table behind a `SeaORM` entity.
    #[must_use]
    pub fn of<E: EntityTrait>() -> Self {
        Self {
            name: E::default().table_name().to_owned(),
            columns: E::Column::iter()
                .map(|column| column.as_str().to_owned())
                .collect(),
            create: create_table::<E>,
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Builds the `CREATE TABLE` statement for a backend.
    #[must_use]
    pub fn create_statement(&self, backend: DbBackend) -> TableCreateStatement {
        (self.create)(&Schema::new(backend))
    }
}

fn create_table<E: EntityTrait>(schema: &Schema) -> TableCreateStatement {
    schema.create_table_from_entity(E::default())
}

/// Ordered collection of table definitions.
///
/// Tables are kept in registration order, which is also creation order, so
/// referenced tables must be registered before the tables that reference them.
#[derive(Debug, Default)]
pub struct SchemaMetadata {
    tables: Vec<TableDef>,
}

impl SchemaMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the table behind an entity.
    #[must_use]
    pub fn with_entity<E: EntityTrait>(mut self) -> Self {
        self.tables.push(TableDef::of::<E>());
        self
    }

    /// All tables in registration order.
    #[must_use]
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Table names in registration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(TableDef::name)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// `CREATE TABLE` statements for every table, in registration order.
    #[must_use]
    pub fn create_statements(&self, backend: DbBackend) -> Vec<TableCreateStatement> {
        self.tables
            .iter()
            .map(|table| table.create_statement(backend))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{admin_users, metadata, reports};

    #[test]
    fn test_metadata_lists_model_tables() {
        let names: Vec<&str> = metadata().table_names().collect();
        assert_eq!(names, vec!["reports", "admin_users"]);
        assert_eq!(metadata().len(), 2);
    }

    #[test]
    fn test_table_def_columns_follow_entity() {
        let table = TableDef::of::<reports::Entity>();
        assert_eq!(table.name(), "reports");
        assert_eq!(table.columns().first().map(String::as_str), Some("id"));
        assert!(table.columns().iter().any(|c| c == "report_no"));
        assert!(table.columns().iter().any(|c| c == "clarity"));
    }

    #[test]
    fn test_table_lookup() {
        assert!(metadata().table("admin_users").is_some());
        assert!(metadata().table("sessions").is_none());
    }

    #[test]
    fn test_create_statements_per_backend() {
        let local = SchemaMetadata::new().with_entity::<admin_users::Entity>();
        let statements = local.create_statements(DbBackend::Sqlite);
        assert_eq!(statements.len(), 1);

        let sql = DbBackend::Sqlite.build(&statements[0]).to_string();
        assert!(sql.starts_with(r#"CREATE TABLE "admin_users""#), "{sql}");
        assert!(sql.contains(r#""email""#));
    }

    #[test]
    fn test_empty_metadata() {
        let empty = SchemaMetadata::new();
        assert!(empty.is_empty());
        assert!(empty.create_statements(DbBackend::Postgres).is_empty());
    }
}
