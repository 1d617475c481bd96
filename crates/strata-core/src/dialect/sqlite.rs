//! SQLite dialect.

use super::{Dialect, SqlDialect, HISTORY_TABLE};
use crate::metadata::FieldMetadata;

/// SQLite dialect for migration SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn map_go_type(&self, go_type: &str) -> &'static str {
        match go_type {
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "bool" => "INTEGER",
            "float32" | "float64" => "REAL",
            "time.Time" => "DATETIME",
            "[]byte" => "BLOB",
            _ => "TEXT",
        }
    }

    /// `AUTOINCREMENT` is only valid on an `INTEGER PRIMARY KEY`.
    fn primary_key_definition(&self, field: &FieldMetadata, sql_type: &str) -> String {
        if field.auto_increment {
            "INTEGER PRIMARY KEY AUTOINCREMENT".to_string()
        } else {
            format!("{sql_type} PRIMARY KEY")
        }
    }

    fn fallback_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);"
        )
    }

    fn alter_column(&self, table: &str, column: &str, sql_type: &str) -> String {
        // SQLite cannot change a column type in place.
        format!(
            "-- SQLite does not support MODIFY COLUMN for {table}.{column}; \
             table recreation required to change its type to {sql_type}"
        )
    }

    fn history_table(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    batch INTEGER NOT NULL,
    executed_at TEXT DEFAULT CURRENT_TIMESTAMP
)"
        )
    }
}
