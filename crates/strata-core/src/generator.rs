//! DDL generation from schema changes.

use tracing::debug;

use crate::change::{ChangeKind, SchemaChange};
use crate::dialect::{Dialect, FALLBACK_COLUMN_TYPE};

/// Forward and reverse SQL of a migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSql {
    pub up: String,
    pub down: String,
}

impl MigrationSql {
    /// Returns true if neither direction has any SQL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }
}

/// Generates dialect-specific DDL for schema changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGenerator {
    dialect: Dialect,
}

impl SqlGenerator {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Generates SQL for all changes, in order. Statements of different
    /// changes are separated by a blank line; changes that produce no SQL
    /// leave no gap.
    #[must_use]
    pub fn generate(&self, changes: &[SchemaChange]) -> MigrationSql {
        let mut up = Vec::new();
        let mut down = Vec::new();

        for change in changes {
            let (u, d) = self.generate_change(change);
            if !u.is_empty() {
                up.push(u);
            }
            if !d.is_empty() {
                down.push(d);
            }
        }

        MigrationSql {
            up: up.join("\n\n"),
            down: down.join("\n\n"),
        }
    }

    /// Generates the `(up, down)` pair for one change. Unrecognized or
    /// incomplete changes produce two empty strings.
    #[must_use]
    pub fn generate_change(&self, change: &SchemaChange) -> (String, String) {
        let sql = self.dialect.sql();
        let table = change.table_name.as_str();
        let column = change.field.as_deref();

        match (change.kind, column) {
            (ChangeKind::CreateTable, _) => {
                let up = match &change.entity {
                    Some(entity) => {
                        let mut statements = vec![sql.create_table(entity)];
                        statements.extend(
                            entity
                                .persisted_fields()
                                .filter(|f| f.indexed)
                                .map(|f| sql.create_index(table, &f.column_name())),
                        );
                        statements.join("\n")
                    }
                    None => sql.fallback_table(table),
                };
                (up, sql.drop_table(table))
            }
            (ChangeKind::DropTable, _) => (
                sql.drop_table(table),
                format!("-- Recreate table {table} manually"),
            ),
            (ChangeKind::AddColumn, Some(column)) => {
                let sql_type = change.new_value.as_deref().unwrap_or(FALLBACK_COLUMN_TYPE);
                (
                    sql.add_column(table, column, sql_type),
                    sql.drop_column(table, column),
                )
            }
            (ChangeKind::DropColumn, Some(column)) => (
                sql.drop_column(table, column),
                format!("-- Add column {column} back to {table} manually"),
            ),
            (ChangeKind::AlterColumn, Some(column)) => {
                match (change.new_value.as_deref(), change.old_value.as_deref()) {
                    (Some(new_type), Some(old_type)) => (
                        sql.alter_column(table, column, new_type),
                        sql.alter_column(table, column, old_type),
                    ),
                    _ => (String::new(), String::new()),
                }
            }
            (kind, _) => {
                debug!(kind = %kind, table = %table, "No SQL for change");
                (String::new(), String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityMetadata, FieldMetadata};

    fn entity() -> EntityMetadata {
        let mut id = FieldMetadata::new("ID", "uint");
        id.primary_key = true;
        id.auto_increment = true;
        let mut email = FieldMetadata::new("Email", "string");
        email.indexed = true;
        email.required = true;
        EntityMetadata {
            name: "User".into(),
            package: "models".into(),
            table_name: "users".into(),
            fields: vec![id, email],
            imports: Vec::new(),
        }
    }

    #[test]
    fn test_create_table_with_index() {
        let (up, down) = SqlGenerator::new(Dialect::Sqlite)
            .generate_change(&SchemaChange::create_table(&entity()));
        assert_eq!(
            up,
            "CREATE TABLE IF NOT EXISTS users (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    email TEXT NOT NULL\n);\nCREATE INDEX idx_users_email ON users (email);"
        );
        assert_eq!(down, "DROP TABLE IF EXISTS users;");
    }

    #[test]
    fn test_create_table_without_entity_uses_fallback() {
        let mut change = SchemaChange::create_table(&entity());
        change.entity = None;
        let (up, _) = SqlGenerator::new(Dialect::MySql).generate_change(&change);
        assert!(up.contains("id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY"));
        assert!(up.contains("ENGINE=InnoDB"));
    }

    #[test]
    fn test_add_column_type() {
        let e = entity();
        let generator = SqlGenerator::new(Dialect::MySql);

        let (up, down) = generator.generate_change(&SchemaChange::add_column(&e, "bio", None));
        assert_eq!(up, "ALTER TABLE users ADD COLUMN bio VARCHAR(255);");
        assert_eq!(down, "ALTER TABLE users DROP COLUMN bio;");

        let (up, _) = generator
            .generate_change(&SchemaChange::add_column(&e, "age", Some("INT".into())));
        assert_eq!(up, "ALTER TABLE users ADD COLUMN age INT;");
    }

    #[test]
    fn test_drop_changes() {
        let generator = SqlGenerator::new(Dialect::Postgres);
        let (up, down) = generator.generate_change(&SchemaChange::drop_table("User", "users"));
        assert_eq!(up, "DROP TABLE IF EXISTS users;");
        assert!(down.starts_with("-- "));

        let (up, down) =
            generator.generate_change(&SchemaChange::drop_column("User", "users", "bio"));
        assert_eq!(up, "ALTER TABLE users DROP COLUMN bio;");
        assert!(down.starts_with("-- "));
    }

    #[test]
    fn test_alter_column_both_directions() {
        let change = SchemaChange::alter_column(&entity(), "age", "int(11)", "BIGINT");
        let (up, down) = SqlGenerator::new(Dialect::MySql).generate_change(&change);
        assert_eq!(up, "ALTER TABLE users MODIFY COLUMN age BIGINT;");
        assert_eq!(down, "ALTER TABLE users MODIFY COLUMN age int(11);");
    }

    #[test]
    fn test_unrecognized_change_is_dropped() {
        let mut unknown = SchemaChange::drop_table("User", "users");
        unknown.kind = ChangeKind::Unrecognized;
        let generator = SqlGenerator::new(Dialect::MySql);
        assert_eq!(generator.generate_change(&unknown), (String::new(), String::new()));

        let add = SchemaChange::add_column(&entity(), "bio", None);
        let sql = generator.generate(&[unknown.clone(), add.clone(), unknown]);
        let single = generator.generate(&[add]);
        assert_eq!(sql, single);
    }

    #[test]
    fn test_generate_joins_with_blank_line() {
        let e = entity();
        let sql = SqlGenerator::new(Dialect::MySql).generate(&[
            SchemaChange::add_column(&e, "a", None),
            SchemaChange::add_column(&e, "b", None),
        ]);
        assert_eq!(
            sql.up,
            "ALTER TABLE users ADD COLUMN a VARCHAR(255);\n\nALTER TABLE users ADD COLUMN b VARCHAR(255);"
        );
        assert_eq!(
            sql.down,
            "ALTER TABLE users DROP COLUMN a;\n\nALTER TABLE users DROP COLUMN b;"
        );
        assert!(!sql.is_empty());
        assert!(SqlGenerator::default().generate(&[]).is_empty());
    }
}
