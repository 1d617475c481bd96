//! MySQL dialect.

use super::{Dialect, SqlDialect, FALLBACK_COLUMN_TYPE, HISTORY_TABLE};
use crate::metadata::FieldMetadata;

/// MySQL dialect for migration SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn map_go_type(&self, go_type: &str) -> &'static str {
        match go_type {
            "int" | "int32" => "INT",
            "int8" => "TINYINT",
            "int16" => "SMALLINT",
            "int64" => "BIGINT",
            "uint" | "uint32" => "INT UNSIGNED",
            "uint8" => "TINYINT UNSIGNED",
            "uint16" => "SMALLINT UNSIGNED",
            "uint64" => "BIGINT UNSIGNED",
            "float32" => "FLOAT",
            "float64" => "DOUBLE",
            "bool" => "BOOLEAN",
            "time.Time" => "TIMESTAMP",
            "[]byte" => "BLOB",
            "uuid.UUID" => "CHAR(36)",
            _ => FALLBACK_COLUMN_TYPE,
        }
    }

    fn primary_key_definition(&self, field: &FieldMetadata, sql_type: &str) -> String {
        if field.auto_increment {
            format!("{sql_type} PRIMARY KEY {}", self.autoincrement_keyword())
        } else {
            format!("{sql_type} PRIMARY KEY")
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn table_options(&self) -> &'static str {
        " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
    }

    fn fallback_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
){};",
            self.table_options()
        )
    }

    fn history_table(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    batch INT NOT NULL,
    executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
){}",
            self.table_options()
        )
    }

    fn text_expr(&self, column: &str) -> String {
        format!("CAST({column} AS CHAR)")
    }
}
