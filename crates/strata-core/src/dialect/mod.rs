//! Dialect-specific SQL generation.
//!
//! Each supported database implements [`SqlDialect`]. The trait carries
//! the Go-type mapping and the DDL statements the generator emits; most
//! statements have a default form that dialects override where their
//! syntax differs.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{EntityMetadata, FieldMetadata};

/// Name of the control table that records applied migrations.
pub const HISTORY_TABLE: &str = "migrations";

/// Type used for a column whose type cannot be inferred.
pub const FALLBACK_COLUMN_TYPE: &str = "VARCHAR(255)";

/// A supported database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Self; 3] = [Self::MySql, Self::Postgres, Self::Sqlite];

    /// Canonical driver name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// SQL generator for this dialect.
    #[must_use]
    pub fn sql(&self) -> &'static dyn SqlDialect {
        match self {
            Self::MySql => &MySqlDialect,
            Self::Postgres => &PostgresDialect,
            Self::Sqlite => &SqliteDialect,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver name that matches no supported dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported database driver: {0}")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// SQL generation for one database dialect.
pub trait SqlDialect: Send + Sync {
    /// Which dialect this is.
    fn dialect(&self) -> Dialect;

    /// Maps a Go type (pointer already stripped) to a SQL type.
    fn map_go_type(&self, go_type: &str) -> &'static str;

    /// SQL type for a field: the storage directive's `type:` entry if
    /// present, else the mapped Go type.
    fn column_type(&self, field: &FieldMetadata) -> String {
        field.sql_type_override().map_or_else(
            || {
                self.map_go_type(field.go_type.trim_start_matches('*'))
                    .to_string()
            },
            str::to_string,
        )
    }

    /// Type and constraints of a primary key column.
    fn primary_key_definition(&self, _field: &FieldMetadata, sql_type: &str) -> String {
        format!("{sql_type} PRIMARY KEY")
    }

    /// Keyword appended to auto-increment columns. Empty if the dialect
    /// has none.
    fn autoincrement_keyword(&self) -> &'static str {
        ""
    }

    /// Suffix after the closing parenthesis of `CREATE TABLE`.
    fn table_options(&self) -> &'static str {
        ""
    }

    /// Full column definition inside `CREATE TABLE`.
    fn column_definition(&self, field: &FieldMetadata) -> String {
        let sql_type = self.column_type(field);
        let name = field.column_name();

        if field.primary_key {
            return format!("{name} {}", self.primary_key_definition(field, &sql_type));
        }

        let mut sql = format!("{name} {sql_type}");
        if field.required {
            sql.push_str(" NOT NULL");
        }
        if field.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(ref default) = field.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(&render_default(default));
        }
        let keyword = self.autoincrement_keyword();
        if field.auto_increment && !keyword.is_empty() {
            sql.push(' ');
            sql.push_str(keyword);
        }
        sql
    }

    /// `CREATE TABLE` for an entity's persisted fields. An entity without
    /// any gets the fallback table.
    fn create_table(&self, entity: &EntityMetadata) -> String {
        let columns: Vec<String> = entity
            .persisted_fields()
            .map(|field| format!("    {}", self.column_definition(field)))
            .collect();

        if columns.is_empty() {
            return self.fallback_table(&entity.table_name);
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n){};",
            entity.table_name,
            columns.join(",\n"),
            self.table_options()
        )
    }

    /// Minimal table with an identity column and two timestamps, used when
    /// no entity is attached to a table creation.
    fn fallback_table(&self, table: &str) -> String;

    /// Generates SQL for CREATE INDEX on one column.
    fn create_index(&self, table: &str, column: &str) -> String {
        format!("CREATE INDEX idx_{table}_{column} ON {table} ({column});")
    }

    /// Generates SQL for DROP TABLE.
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {table};")
    }

    /// Generates SQL for ADD COLUMN.
    fn add_column(&self, table: &str, column: &str, sql_type: &str) -> String {
        format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type};")
    }

    /// Generates SQL for DROP COLUMN.
    fn drop_column(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {table} DROP COLUMN {column};")
    }

    /// Generates SQL that changes a column's type.
    fn alter_column(&self, table: &str, column: &str, sql_type: &str) -> String {
        format!("ALTER TABLE {table} MODIFY COLUMN {column} {sql_type};")
    }

    /// `CREATE TABLE IF NOT EXISTS` for the migration control table.
    fn history_table(&self) -> String;

    /// Bind placeholder for the `index`-th (1-based) query parameter.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// Expression selecting `column` as text.
    fn text_expr(&self, column: &str) -> String {
        column.to_string()
    }
}

const SQL_KEYWORDS: [&str; 6] = [
    "NULL",
    "TRUE",
    "FALSE",
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
];

/// Renders a declared default value as a SQL literal.
///
/// Numbers, quoted literals and SQL keywords are kept as written. Anything
/// else becomes a single-quoted string.
#[must_use]
pub fn render_default(value: &str) -> String {
    let trimmed = value.trim();
    let is_quoted = trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'');
    let is_keyword = SQL_KEYWORDS
        .iter()
        .any(|kw| trimmed.eq_ignore_ascii_case(kw));

    if is_quoted || is_keyword || trimmed.parse::<f64>().is_ok() {
        trimmed.to_string()
    } else {
        format!("'{}'", trimmed.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("mysql".parse::<Dialect>(), Ok(Dialect::MySql));
        assert_eq!("PostgreSQL".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("sqlite3".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert_eq!(
            "oracle".parse::<Dialect>(),
            Err(UnknownDialect("oracle".into()))
        );
        assert_eq!(Dialect::default(), Dialect::MySql);
    }

    #[test]
    fn test_dialect_sql_matches() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.sql().dialect(), dialect);
            assert_eq!(dialect.as_str().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_render_default() {
        assert_eq!(render_default("0"), "0");
        assert_eq!(render_default("1.5"), "1.5");
        assert_eq!(render_default("'active'"), "'active'");
        assert_eq!(render_default("active"), "'active'");
        assert_eq!(render_default("it's"), "'it''s'");
        assert_eq!(render_default("current_timestamp"), "current_timestamp");
        assert_eq!(render_default("NULL"), "NULL");
        assert_eq!(render_default("'"), "''''");
    }

    #[test]
    fn test_column_type_override() {
        let mut field = FieldMetadata::new("Name", "string");
        assert_eq!(Dialect::MySql.sql().column_type(&field), "VARCHAR(255)");
        field.storage_directive = "type:varchar(100);not null".into();
        assert_eq!(Dialect::MySql.sql().column_type(&field), "varchar(100)");
        assert_eq!(Dialect::Sqlite.sql().column_type(&field), "varchar(100)");
    }

    #[test]
    fn test_column_constraint_order() {
        let mut field = FieldMetadata::new("Status", "string");
        field.required = true;
        field.unique = true;
        field.default_value = Some("active".into());
        assert_eq!(
            Dialect::Postgres.sql().column_definition(&field),
            "status VARCHAR(255) NOT NULL UNIQUE DEFAULT 'active'"
        );
    }

    #[test]
    fn test_pointer_types_map_like_values() {
        let field = FieldMetadata::new("DeletedAt", "*time.Time");
        assert_eq!(Dialect::MySql.sql().column_type(&field), "TIMESTAMP");
        assert_eq!(Dialect::Sqlite.sql().column_type(&field), "DATETIME");
    }
}
