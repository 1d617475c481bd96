//! Introspected database schema.
//!
//! These types hold what a live database reports, with each dialect's
//! catalog quirks already folded into plain fields. SQL types are kept as
//! the database spells them; compare them through [`normalize_sql_type`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Native type string (`varchar(255)`, `character varying`, `INTEGER`).
    pub sql_type: String,
    pub nullable: bool,
    /// Default expression as reported, if any.
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub is_unique: bool,
}

impl ColumnSchema {
    /// Creates a nullable column with no default or key flags.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            default_value: None,
            is_primary_key: false,
            is_unique: false,
        }
    }
}

/// A table as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Creates a table with the given columns.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// All user tables of a database, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    tables: BTreeMap<String, TableSchema>,
}

impl DatabaseSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Iterates over tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}

impl FromIterator<TableSchema> for DatabaseSchema {
    fn from_iter<I: IntoIterator<Item = TableSchema>>(iter: I) -> Self {
        let mut schema = Self::new();
        for table in iter {
            schema.insert(table);
        }
        schema
    }
}

/// Reduces a SQL type to a comparable family name.
///
/// Size parameters, modifiers and catalog spellings are dropped, so
/// `VARCHAR(100)`, `varchar(20)` and `character varying` all become
/// `VARCHAR`, and `int(11) unsigned` and `INTEGER` become `INT`.
#[must_use]
pub fn normalize_sql_type(sql_type: &str) -> String {
    let upper = sql_type.trim().to_uppercase();

    // Multi-word catalog spellings and boolean aliases.
    if upper.starts_with("CHARACTER VARYING") {
        return "VARCHAR".to_string();
    }
    if upper.starts_with("TINYINT(1)") || upper == "BOOL" || upper == "BOOLEAN" {
        return "BOOLEAN".to_string();
    }

    let word = upper.split_whitespace().next().unwrap_or_default();
    let base = word.split('(').next().unwrap_or_default();

    let family = match base {
        "SERIAL" => "INT",
        "BIGSERIAL" => "BIGINT",
        "SMALLSERIAL" => "SMALLINT",
        b if b.starts_with("VARCHAR") => "VARCHAR",
        b if b.starts_with("CHAR") => "CHAR",
        b if b.starts_with("BIGINT") => "BIGINT",
        b if b.starts_with("INT") => "INT",
        b if b.starts_with("TIMESTAMP") || b.starts_with("DATETIME") => "TIMESTAMP",
        b if b.starts_with("TINYINT") => "TINYINT",
        b if b.starts_with("TEXT") => "TEXT",
        b if b.starts_with("BLOB") => "BLOB",
        b if b.starts_with("DOUBLE") => "DOUBLE",
        b if b.starts_with("FLOAT") => "FLOAT",
        other => other,
    };
    family.to_string()
}
