use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use strata_core::{ColumnSchema, Dialect};

use super::{ensure_deleted, Database};
use crate::error::Result;
use crate::history::{HistoryQueries, HistoryRow, MigrationRecord};

const LIST_TABLES_SQL: &str =
    "SELECT tablename::text FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename";

const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text, is_nullable::text, \
     column_default::text FROM information_schema.columns \
     WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position";

/// Single-column primary key and unique constraints of a table.
const KEY_COLUMNS_SQL: &str = "SELECT kcu.column_name::text, tc.constraint_type::text \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
     WHERE tc.table_schema = 'public' AND tc.table_name = $1 \
       AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
       AND (SELECT COUNT(*) FROM information_schema.key_column_usage k \
            WHERE k.constraint_name = tc.constraint_name \
              AND k.table_schema = tc.table_schema) = 1";

/// PostgreSQL database backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    queries: HistoryQueries,
}

impl PostgresDatabase {
    /// Opens a single-connection pool.
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            queries: HistoryQueries::new(Dialect::Postgres),
        }
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(COLUMNS_SQL)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        let keys: HashMap<String, String> = sqlx::query_as::<_, (String, String)>(KEY_COLUMNS_SQL)
            .bind(table)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|(name, sql_type, nullable, default_value)| {
                let key = keys.get(&name).map(String::as_str);
                ColumnSchema {
                    nullable: nullable == "YES",
                    is_primary_key: key == Some("PRIMARY KEY"),
                    is_unique: key == Some("UNIQUE"),
                    default_value,
                    sql_type,
                    name,
                }
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
