//! Schema differ.
//!
//! Compares parsed entities against an introspected [`DatabaseSchema`]
//! and produces the ordered list of [`SchemaChange`]s that brings the
//! database in line with the models. Changes come out in entity order,
//! then field order within an entity.
//!
//! Tables and columns present in the database but absent from the models
//! are not reported.

use crate::change::SchemaChange;
use crate::dialect::{Dialect, SqlDialect};
use crate::metadata::{EntityMetadata, FieldMetadata};
use crate::schema::{normalize_sql_type, ColumnSchema, DatabaseSchema, TableSchema};

/// Detects differences between models and a database schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaDiffer {
    dialect: Dialect,
}

impl SchemaDiffer {
    /// Creates a differ that maps field types for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Dialect used for type comparison.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// One `CREATE_TABLE` per entity, each with its entity attached.
    #[must_use]
    pub fn all_new(entities: &[EntityMetadata]) -> Vec<SchemaChange> {
        entities.iter().map(SchemaChange::create_table).collect()
    }

    /// Compares entities against `schema`.
    #[must_use]
    pub fn diff(&self, entities: &[EntityMetadata], schema: &DatabaseSchema) -> Vec<SchemaChange> {
        let mut changes = Vec::new();
        for entity in entities {
            match schema.table(&entity.table_name) {
                Some(table) => changes.extend(self.diff_table(entity, table)),
                None => changes.push(SchemaChange::create_table(entity)),
            }
        }
        changes
    }

    fn diff_table(&self, entity: &EntityMetadata, table: &TableSchema) -> Vec<SchemaChange> {
        let sql = self.dialect.sql();
        let mut changes = Vec::new();

        for field in entity.persisted_fields() {
            let column = field.column_name();
            match table.column(&column) {
                None => changes.push(SchemaChange::add_column(
                    entity,
                    &column,
                    Some(sql.column_type(field)),
                )),
                Some(existing) => {
                    if let Some(expected) = type_change(sql, field, existing) {
                        changes.push(SchemaChange::alter_column(
                            entity,
                            &column,
                            existing.sql_type.clone(),
                            expected,
                        ));
                    }
                }
            }
        }

        changes
    }
}

/// Returns the expected SQL type if it differs from the column's.
fn type_change(
    sql: &dyn SqlDialect,
    field: &FieldMetadata,
    column: &ColumnSchema,
) -> Option<String> {
    if field.go_type == "interface{}" {
        return None;
    }
    let expected = sql.column_type(field);
    (normalize_sql_type(&expected) != normalize_sql_type(&column.sql_type)).then_some(expected)
}
