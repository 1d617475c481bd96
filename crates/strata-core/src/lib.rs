//! # strata-core
//!
//! Database-free half of the strata migration engine.
//!
//! This crate provides:
//! - A hand-written Go lexer and declaration parser, enough to read model
//!   structs, their tags and their doc comments
//! - The `strata:` annotation language and the entity metadata built from it
//! - Normalized schema types for what a live database reports
//! - A differ that turns models plus a schema into ordered schema changes
//! - Dialect-aware DDL generation for MySQL, PostgreSQL and SQLite
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{parse_model_source, Dialect, SchemaDiffer, SqlGenerator};
//!
//! let source = r#"
//! package models
//!
//! type Product struct {
//!     // strata: primaryKey; autoIncrement
//!     ID uint `json:"id"`
//!     // strata: required; unique
//!     Name string `json:"name"`
//! }
//! "#;
//!
//! let entity = parse_model_source(source, "product.go").unwrap();
//! let changes = SchemaDiffer::all_new(&[entity]);
//! let sql = SqlGenerator::new(Dialect::Postgres).generate(&changes);
//!
//! assert!(sql.up.contains("id SERIAL PRIMARY KEY"));
//! assert!(sql.up.contains("name VARCHAR(255) NOT NULL UNIQUE"));
//! assert_eq!(sql.down, "DROP TABLE IF EXISTS products;");
//! ```

pub mod annotations;
pub mod ast;
pub mod change;
pub mod diff;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod metadata;
pub mod naming;
pub mod parser;
pub mod schema;

pub use change::{ChangeKind, SchemaChange};
pub use dialect::{Dialect, SqlDialect, UnknownDialect, HISTORY_TABLE};
pub use diff::SchemaDiffer;
pub use error::ParseError;
pub use generator::{MigrationSql, SqlGenerator};
pub use metadata::{
    parse_model_file, parse_model_source, EntityMetadata, FieldMetadata, RelationMetadata,
    ValidationError,
};
pub use schema::{normalize_sql_type, ColumnSchema, DatabaseSchema, TableSchema};
