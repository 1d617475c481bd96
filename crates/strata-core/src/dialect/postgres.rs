//! PostgreSQL dialect.

use super::{Dialect, SqlDialect, FALLBACK_COLUMN_TYPE, HISTORY_TABLE};
use crate::metadata::FieldMetadata;

/// PostgreSQL dialect for migration SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn map_go_type(&self, go_type: &str) -> &'static str {
        match go_type {
            "int" | "int32" | "uint" | "uint32" => "INTEGER",
            "int8" | "int16" | "uint8" | "uint16" => "SMALLINT",
            "int64" | "uint64" => "BIGINT",
            "float32" => "REAL",
            "float64" => "DOUBLE PRECISION",
            "bool" => "BOOLEAN",
            "time.Time" => "TIMESTAMP",
            "[]byte" => "BYTEA",
            "uuid.UUID" => "UUID",
            _ => FALLBACK_COLUMN_TYPE,
        }
    }

    /// Integer keys become `SERIAL`/`BIGSERIAL`, which replaces the type.
    fn primary_key_definition(&self, field: &FieldMetadata, sql_type: &str) -> String {
        if field.sql_type_override().is_some() {
            return format!("{sql_type} PRIMARY KEY");
        }
        match field.go_type.trim_start_matches('*') {
            "int64" | "uint64" => "BIGSERIAL PRIMARY KEY".to_string(),
            "int" | "int8" | "int16" | "int32" | "uint" | "uint8" | "uint16" | "uint32" => {
                "SERIAL PRIMARY KEY".to_string()
            }
            _ => format!("{sql_type} PRIMARY KEY"),
        }
    }

    fn fallback_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id BIGSERIAL PRIMARY KEY,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);"
        )
    }

    fn alter_column(&self, table: &str, column: &str, sql_type: &str) -> String {
        format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE {sql_type};")
    }

    fn history_table(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    batch INTEGER NOT NULL,
    executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"
        )
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn text_expr(&self, column: &str) -> String {
        format!("CAST({column} AS TEXT)")
    }
}
