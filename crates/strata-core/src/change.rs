//! Schema changes produced by the differ and consumed by the generator.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::EntityMetadata;

/// Kind of a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    AlterColumn,
    /// A kind this version does not know. Generates no SQL.
    #[serde(other)]
    Unrecognized,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CREATE_TABLE",
            Self::DropTable => "DROP_TABLE",
            Self::AddColumn => "ADD_COLUMN",
            Self::DropColumn => "DROP_COLUMN",
            Self::AlterColumn => "ALTER_COLUMN",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One difference between the declared models and the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub entity_name: String,
    pub table_name: String,
    /// Column the change applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Full entity, attached to table creations so complete DDL can be
    /// generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityMetadata>,
}

impl SchemaChange {
    fn new(kind: ChangeKind, entity_name: &str, table_name: &str, description: String) -> Self {
        Self {
            kind,
            entity_name: entity_name.to_string(),
            table_name: table_name.to_string(),
            field: None,
            description,
            old_value: None,
            new_value: None,
            entity: None,
        }
    }

    /// A new table for `entity`, with the entity attached.
    #[must_use]
    pub fn create_table(entity: &EntityMetadata) -> Self {
        let mut change = Self::new(
            ChangeKind::CreateTable,
            &entity.name,
            &entity.table_name,
            format!("Create table {}", entity.table_name),
        );
        change.entity = Some(entity.clone());
        change
    }

    /// A table that no longer has a model.
    #[must_use]
    pub fn drop_table(entity_name: &str, table_name: &str) -> Self {
        Self::new(
            ChangeKind::DropTable,
            entity_name,
            table_name,
            format!("Drop table {table_name}"),
        )
    }

    /// A column missing from an existing table. `sql_type` is the type
    /// the model expects, when known.
    #[must_use]
    pub fn add_column(entity: &EntityMetadata, column: &str, sql_type: Option<String>) -> Self {
        let mut change = Self::new(
            ChangeKind::AddColumn,
            &entity.name,
            &entity.table_name,
            format!("Add column {column} to {}", entity.table_name),
        );
        change.field = Some(column.to_string());
        change.new_value = sql_type;
        change
    }

    /// A column that no longer has a field.
    #[must_use]
    pub fn drop_column(entity_name: &str, table_name: &str, column: &str) -> Self {
        let mut change = Self::new(
            ChangeKind::DropColumn,
            entity_name,
            table_name,
            format!("Drop column {column} from {table_name}"),
        );
        change.field = Some(column.to_string());
        change
    }

    /// A column whose type differs from the model's.
    #[must_use]
    pub fn alter_column(
        entity: &EntityMetadata,
        column: &str,
        old_type: impl Into<String>,
        new_type: impl Into<String>,
    ) -> Self {
        let mut change = Self::new(
            ChangeKind::AlterColumn,
            &entity.name,
            &entity.table_name,
            format!("Change type of column {column} in {}", entity.table_name),
        );
        change.field = Some(column.to_string());
        change.old_value = Some(old_type.into());
        change.new_value = Some(new_type.into());
        change
    }
}
