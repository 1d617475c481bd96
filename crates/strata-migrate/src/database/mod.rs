//! Database access for introspection and migration bookkeeping.
//!
//! [`Database`] is the one seam between the engine and a live database.
//! Each backend implements it over its own sqlx pool; the runner and the
//! introspector only ever see `&dyn Database`, which keeps them testable
//! with in-memory SQLite or a fake.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDatabase;
pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;

use async_trait::async_trait;
use strata_core::{ColumnSchema, Dialect};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{MigrateError, Result};
use crate::history::MigrationRecord;

/// A connection to one of the supported databases.
#[async_trait]
pub trait Database: Send + Sync {
    /// The SQL dialect spoken by this database.
    fn dialect(&self) -> Dialect;

    /// Executes a single statement.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Names of the user tables, sorted.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns of `table` in ordinal order.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnSchema>>;

    /// Creates the control table if it does not exist yet.
    async fn ensure_history_table(&self) -> Result<()> {
        self.execute(&self.dialect().sql().history_table()).await
    }

    /// All control table records, oldest first.
    async fn fetch_history(&self) -> Result<Vec<MigrationRecord>>;

    /// Records `name` as applied in `batch`.
    async fn insert_history(&self, name: &str, batch: i32) -> Result<()>;

    /// Removes the record for `name`.
    ///
    /// Fails with [`MigrateError::HistoryRecordMissing`] if there is none.
    async fn delete_history(&self, name: &str) -> Result<()>;
}

/// Opens a connection for the configured driver.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn Database>> {
    let dialect = config.dialect()?;
    debug!(driver = %dialect, host = %config.host, "Connecting to database");

    let database: Box<dyn Database> = match dialect {
        Dialect::MySql => Box::new(MySqlDatabase::connect(config.mysql_options()).await?),
        Dialect::Postgres => Box::new(PostgresDatabase::connect(config.postgres_options()?).await?),
        Dialect::Sqlite => Box::new(SqliteDatabase::connect(config.sqlite_options()).await?),
    };
    Ok(database)
}

/// Maps a zero-row delete to [`MigrateError::HistoryRecordMissing`].
fn ensure_deleted(name: &str, rows_affected: u64) -> Result<()> {
    if rows_affected == 0 {
        return Err(MigrateError::HistoryRecordMissing(name.to_string()));
    }
    Ok(())
}
