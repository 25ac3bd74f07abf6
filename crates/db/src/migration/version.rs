//! Version table bookkeeping.
//!
//! Applied revisions live in `seaql_migrations`, the same table
//! sea-orm-migration maintains, so either tool can read the history.

use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryOrder, Schema, Statement,
};
use sea_orm_migration::prelude::*;
use sea_orm_migration::seaql_migrations;

/// Builds `CREATE TABLE IF NOT EXISTS seaql_migrations`.
#[must_use]
pub fn create_table(backend: DbBackend) -> Statement {
    let mut stmt = Schema::new(backend).create_table_from_entity(seaql_migrations::Entity);
    stmt.if_not_exists();
    backend.build(&stmt)
}

/// Builds the insert recording `version` as applied.
///
/// `applied_at` is in unix seconds. Without one the database fills in its own
/// clock when the statement runs.
#[must_use]
pub fn insert(backend: DbBackend, version: &str, applied_at: Option<i64>) -> Statement {
    let applied_at = match applied_at {
        Some(seconds) => seconds.into(),
        None => Expr::cust(current_unix_seconds(backend)),
    };
    let stmt = Query::insert()
        .into_table(seaql_migrations::Entity)
        .columns([
            seaql_migrations::Column::Version,
            seaql_migrations::Column::AppliedAt,
        ])
        .values_panic([version.into(), applied_at])
        .to_owned();
    backend.build(&stmt)
}

/// SQL yielding the current unix time in seconds.
fn current_unix_seconds(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Postgres => "CAST(EXTRACT(EPOCH FROM CURRENT_TIMESTAMP) AS BIGINT)",
        DbBackend::MySql => "UNIX_TIMESTAMP()",
        DbBackend::Sqlite => "CAST(strftime('%s', 'now') AS INTEGER)",
    }
}

/// Builds the delete removing the record for `version`.
#[must_use]
pub fn delete(backend: DbBackend, version: &str) -> Statement {
    let stmt = Query::delete()
        .from_table(seaql_migrations::Entity)
        .and_where(Expr::col(seaql_migrations::Column::Version).eq(version))
        .to_owned();
    backend.build(&stmt)
}

/// Loads applied revisions, oldest first.
pub async fn applied<C>(db: &C) -> Result<Vec<seaql_migrations::Model>, DbErr>
where
    C: ConnectionTrait,
{
    seaql_migrations::Entity::find()
        .order_by_asc(seaql_migrations::Column::Version)
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_is_idempotent_ddl() {
        let sql = create_table(DbBackend::Sqlite).to_string();
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "seaql_migrations""#), "{sql}");
        assert!(sql.contains(r#""version""#));
        assert!(sql.contains(r#""applied_at""#));
    }

    #[test]
    fn test_insert_binds_values() {
        let stmt = insert(DbBackend::Postgres, "m20250101_000001_create_report_tables", Some(42));
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "seaql_migrations" ("version", "applied_at") VALUES ($1, $2)"#
        );
        assert_eq!(
            stmt.to_string(),
            r#"INSERT INTO "seaql_migrations" ("version", "applied_at") VALUES ('m20250101_000001_create_report_tables', 42)"#
        );
    }

    #[test]
    fn test_insert_without_timestamp_uses_database_clock() {
        let sql = insert(DbBackend::Sqlite, "m1", None).to_string();
        assert_eq!(
            sql,
            r#"INSERT INTO "seaql_migrations" ("version", "applied_at") VALUES ('m1', CAST(strftime('%s', 'now') AS INTEGER))"#
        );

        let sql = insert(DbBackend::Postgres, "m1", None).to_string();
        assert!(sql.ends_with("CAST(EXTRACT(EPOCH FROM CURRENT_TIMESTAMP) AS BIGINT))"), "{sql}");
        let sql = insert(DbBackend::MySql, "m1", None).to_string();
        assert!(sql.ends_with("UNIX_TIMESTAMP())"), "{sql}");
    }

    #[tokio::test]
    async fn test_database_clock_insert_runs_on_sqlite() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        db.execute(create_table(DbBackend::Sqlite)).await.unwrap();
        db.execute(insert(DbBackend::Sqlite, "m1", None)).await.unwrap();

        let records = applied(&db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, "m1");
        assert!(records[0].applied_at > 1_700_000_000);
    }

    #[test]
    fn test_delete_targets_one_version() {
        let stmt = delete(DbBackend::Sqlite, "m1");
        assert_eq!(
            stmt.to_string(),
            r#"DELETE FROM "seaql_migrations" WHERE "version" = 'm1'"#
        );
    }
}
