//! Migration history tracking.
//!
//! The `migrations` control table holds one row per applied migration file
//! together with the batch it was applied in. The table itself is created by
//! the dialect's `history_table` DDL; this module builds the queries that read
//! and write it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use strata_core::{Dialect, HISTORY_TABLE};

/// Row shape fetched by [`HistoryQueries::select_all`].
pub type HistoryRow = (i64, String, i32, Option<String>);

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Unique ID in the migrations table.
    pub id: i64,
    /// Migration file name.
    pub name: String,
    /// Batch the migration was applied in.
    pub batch: i32,
    /// When the migration was applied.
    pub executed_at: DateTime<Utc>,
}

impl MigrationRecord {
    /// Builds a record from a fetched row.
    #[must_use]
    pub fn from_row((id, name, batch, executed_at): HistoryRow) -> Self {
        Self {
            id,
            name,
            batch,
            executed_at: executed_at
                .as_deref()
                .map_or_else(Utc::now, parse_timestamp),
        }
    }
}

/// Parses a timestamp as rendered by any of the supported databases.
#[must_use]
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f")
                .map(|dt| dt.and_utc())
                .unwrap_or_else(|_| Utc::now())
        })
}

/// Queries against the control table, spelled for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct HistoryQueries {
    dialect: Dialect,
}

impl HistoryQueries {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// `CREATE TABLE IF NOT EXISTS` for the control table.
    #[must_use]
    pub fn create_table(&self) -> String {
        self.dialect.sql().history_table()
    }

    /// Selects every record as a [`HistoryRow`], oldest first.
    #[must_use]
    pub fn select_all(&self) -> String {
        format!(
            "SELECT id, name, batch, {} FROM {HISTORY_TABLE} ORDER BY id",
            self.dialect.sql().text_expr("executed_at")
        )
    }

    /// Inserts a record; binds `name` then `batch`.
    #[must_use]
    pub fn insert(&self) -> String {
        let sql = self.dialect.sql();
        format!(
            "INSERT INTO {HISTORY_TABLE} (name, batch) VALUES ({}, {})",
            sql.placeholder(1),
            sql.placeholder(2)
        )
    }

    /// Deletes the record with the bound name.
    #[must_use]
    pub fn delete(&self) -> String {
        format!(
            "DELETE FROM {HISTORY_TABLE} WHERE name = {}",
            self.dialect.sql().placeholder(1)
        )
    }
}

/// Highest batch number among `records`, or 0 when there are none.
#[must_use]
pub fn last_batch(records: &[MigrationRecord]) -> i32 {
    records.iter().map(|r| r.batch).max().unwrap_or(0)
}
