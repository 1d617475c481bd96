//! End-to-end tests from model source to generated DDL.

mod common;
use common::*;

use strata_core::{
    ChangeKind, ColumnSchema, DatabaseSchema, Dialect, EntityMetadata, SchemaChange,
    SchemaDiffer, SqlGenerator, TableSchema,
};

/// Schema a database would report after running the generated DDL.
fn schema_after_create(entity: &EntityMetadata, dialect: Dialect) -> DatabaseSchema {
    let sql = dialect.sql();
    let columns = entity
        .persisted_fields()
        .map(|field| ColumnSchema::new(field.column_name(), sql.column_type(field)))
        .collect();
    [TableSchema::new(entity.table_name.clone(), columns)]
        .into_iter()
        .collect()
}

#[test]
fn scenario_new_entity_against_empty_database() {
    let entity = parse(PRODUCT);

    for dialect in Dialect::ALL {
        let changes = SchemaDiffer::new(dialect).diff(&[entity.clone()], &DatabaseSchema::new());
        assert_eq!(changes.len(), 1, "{dialect}");
        assert_eq!(changes[0].kind, ChangeKind::CreateTable);

        let sql = SqlGenerator::new(dialect).generate(&changes);
        let name_line = sql
            .up
            .lines()
            .find(|line| line.trim_start().starts_with("name "))
            .unwrap_or_else(|| panic!("no name column in:\n{}", sql.up));
        assert!(name_line.contains("NOT NULL"), "{name_line}");
        assert!(name_line.contains("UNIQUE"), "{name_line}");

        let integer = dialect.sql().map_go_type("int");
        assert!(
            sql.up.contains(&format!("age {integer}")),
            "{dialect}: {}",
            sql.up
        );
        assert_eq!(sql.down, "DROP TABLE IF EXISTS products;");
    }
}

#[test]
fn scenario_mysql_create_table_text() {
    let changes = SchemaDiffer::all_new(&[parse(PRODUCT)]);
    let sql = SqlGenerator::new(Dialect::MySql).generate(&changes);
    assert_eq!(
        sql.up,
        "CREATE TABLE IF NOT EXISTS products (
    id INT UNSIGNED PRIMARY KEY AUTO_INCREMENT,
    name VARCHAR(255) NOT NULL UNIQUE,
    age INT,
    created_at TIMESTAMP
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci;"
    );
}

#[test]
fn scenario_added_field_becomes_add_column() {
    let before = parse(PRODUCT);
    let after = parse(PRODUCT_WITH_BIO);

    for dialect in Dialect::ALL {
        let schema = schema_after_create(&before, dialect);
        let changes = SchemaDiffer::new(dialect).diff(&[after.clone()], &schema);
        assert_eq!(changes.len(), 1, "{dialect}: {changes:?}");
        assert_eq!(changes[0].kind, ChangeKind::AddColumn);
        assert_eq!(changes[0].field.as_deref(), Some("bio"));
    }
}

#[test]
fn create_then_detect_again_yields_no_changes() {
    let entity = parse(PRODUCT);
    for dialect in Dialect::ALL {
        let schema = schema_after_create(&entity, dialect);
        let changes = SchemaDiffer::new(dialect).diff(&[entity.clone()], &schema);
        assert!(changes.is_empty(), "{dialect}: {changes:?}");
    }
}

#[test]
fn mysql_catalog_spelling_yields_no_changes() {
    let entity = parse(PRODUCT);
    let schema: DatabaseSchema = [TableSchema::new(
        "products",
        vec![
            ColumnSchema::new("id", "int unsigned"),
            ColumnSchema::new("name", "varchar(255)"),
            ColumnSchema::new("age", "int"),
            ColumnSchema::new("created_at", "timestamp"),
        ],
    )]
    .into_iter()
    .collect();
    assert!(SchemaDiffer::new(Dialect::MySql)
        .diff(&[entity], &schema)
        .is_empty());
}

#[test]
fn changes_follow_entity_then_field_order() {
    let product = parse(PRODUCT_WITH_BIO);
    let order = parse("package models\n\ntype Order struct {\n\tTotal float64\n}\n");

    let mut schema = schema_after_create(&parse(PRODUCT), Dialect::Sqlite);
    schema.insert(TableSchema::new("orders", Vec::new()));

    let changes = SchemaDiffer::new(Dialect::Sqlite).diff(&[order, product], &schema);
    let summary: Vec<_> = changes
        .iter()
        .map(|c| (c.table_name.as_str(), c.field.as_deref()))
        .collect();
    assert_eq!(summary, [("orders", Some("total")), ("products", Some("bio"))]);
}

#[test]
fn change_list_survives_json() {
    let changes = SchemaDiffer::all_new(&[parse(PRODUCT)]);
    let json = serde_json::to_string_pretty(&changes).unwrap();
    let back: Vec<SchemaChange> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, changes);

    let generator = SqlGenerator::new(Dialect::Postgres);
    assert_eq!(generator.generate(&back), generator.generate(&changes));
}
