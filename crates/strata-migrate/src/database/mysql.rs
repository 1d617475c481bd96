use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use strata_core::{ColumnSchema, Dialect};

use super::{ensure_deleted, Database};
use crate::error::Result;
use crate::history::{HistoryQueries, HistoryRow, MigrationRecord};

// Catalog text is cast to CHAR: MySQL 8 reports several information_schema
// columns as binary strings.
const LIST_TABLES_SQL: &str = "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME";

const COLUMNS_SQL: &str = "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), \
     CAST(IS_NULLABLE AS CHAR), CAST(COLUMN_DEFAULT AS CHAR), CAST(COLUMN_KEY AS CHAR) \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

/// MySQL database backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    pool: MySqlPool,
    queries: HistoryQueries,
}

impl MySqlDatabase {
    /// Opens a single-connection pool.
    pub async fn connect(options: MySqlConnectOptions) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool,
            queries: HistoryQueries::new(Dialect::MySql),
        }
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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
        let rows: Vec<(String, String, String, Option<String>, String)> =
            sqlx::query_as(COLUMNS_SQL)
                .bind(table)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, sql_type, nullable, default_value, key)| ColumnSchema {
                nullable: nullable == "YES",
                is_primary_key: key == "PRI",
                is_unique: key == "UNI",
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
