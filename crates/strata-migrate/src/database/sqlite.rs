use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use strata_core::{ColumnSchema, Dialect};

use super::{ensure_deleted, Database};
use crate::error::Result;
use crate::history::{HistoryQueries, HistoryRow, MigrationRecord};

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const TABLE_INFO_SQL: &str =
    r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#;

/// Columns covered by a single-column `UNIQUE` constraint.
const UNIQUE_COLUMNS_SQL: &str = r#"SELECT ii.name
FROM pragma_index_list(?1) AS il, pragma_index_info(il.name) AS ii
WHERE il."unique" = 1 AND il.origin = 'u'
  AND (SELECT COUNT(*) FROM pragma_index_info(il.name)) = 1"#;

/// SQLite database backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
    queries: HistoryQueries,
}

impl SqliteDatabase {
    /// Opens a single-connection pool.
    pub async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            queries: HistoryQueries::new(Dialect::Sqlite),
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnSchema>> {
        let rows: Vec<(String, String, i64, Option<String>, i64)> =
            sqlx::query_as(TABLE_INFO_SQL)
                .bind(table)
                .fetch_all(&self.pool)
                .await?;

        let unique: BTreeSet<String> = sqlx::query_as::<_, (Option<String>,)>(UNIQUE_COLUMNS_SQL)
            .bind(table)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter_map(|(name,)| name)
            .collect();

        Ok(rows
            .into_iter()
            .map(|(name, sql_type, not_null, default_value, pk)| ColumnSchema {
                nullable: not_null == 0 && pk == 0,
                is_primary_key: pk > 0,
                is_unique: unique.contains(&name),
                default_value,
                sql_type,
                name,
            })
            .collect())
    }

    async fn fetch_history(&self) -> Result<Vec<MigrationRecord>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(&self.queries.select_all())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MigrationRecord::from_row).collect())
    }

    async fn insert_history(&self, name: &str, batch: i32) -> Result<()> {
        sqlx::query(&self.queries.insert())
            .bind(name)
            .bind(batch)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_history(&self, name: &str) -> Result<()> {
        let result = sqlx::query(&self.queries.delete())
            .bind(name)
            .execute(&self.pool)
            .await?;
        ensure_deleted(name, result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;

    async fn database() -> SqliteDatabase {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        SqliteDatabase::from_pool(pool)
    }

    #[tokio::test]
    async fn test_list_tables_skips_internal() {
        let db = database().await;
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, email TEXT)")
            .await
            .unwrap();
        db.execute("CREATE TABLE audit (id INTEGER)").await.unwrap();

        // AUTOINCREMENT creates sqlite_sequence.
        assert_eq!(db.list_tables().await.unwrap(), ["audit", "users"]);
    }

    #[tokio::test]
    async fn test_describe_table() {
        let db = database().await;
        db.execute(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL UNIQUE,
                nick TEXT DEFAULT 'anon',
                age INTEGER
            )",
        )
        .await
        .unwrap();

        let columns = db.describe_table("users").await.unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "email", "nick", "age"]);

        assert!(columns[0].is_primary_key);
        assert!(!columns[0].nullable);

        assert_eq!(columns[1].sql_type, "VARCHAR(255)");
        assert!(!columns[1].nullable);
        assert!(columns[1].is_unique);

        assert_eq!(columns[2].default_value.as_deref(), Some("'anon'"));
        assert!(columns[3].nullable);
        assert!(!columns[3].is_unique);
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let db = database().await;
        db.ensure_history_table().await.unwrap();
        db.ensure_history_table().await.unwrap();

        db.insert_history("20260101000000_a.sql", 1).await.unwrap();
        db.insert_history("20260102000000_b.sql", 2).await.unwrap();

        let records = db.fetch_history().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "20260101000000_a.sql");
        assert_eq!(records[1].batch, 2);

        db.delete_history("20260101000000_a.sql").await.unwrap();
        assert_eq!(db.fetch_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let db = database().await;
        db.ensure_history_table().await.unwrap();
        assert!(matches!(
            db.delete_history("nope.sql").await,
            Err(MigrateError::HistoryRecordMissing(name)) if name == "nope.sql"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = database().await;
        db.ensure_history_table().await.unwrap();
        db.insert_history("a.sql", 1).await.unwrap();
        assert!(db.insert_history("a.sql", 2).await.is_err());
    }
}
