#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use strata_core::{ColumnSchema, Dialect};
use strata_migrate::history::MigrationRecord;
use strata_migrate::migration_file::{MigrationDir, MigrationFile};
use strata_migrate::prelude::{Database, SqliteDatabase};
use strata_migrate::{MigrateError, Result};
use tempfile::TempDir;

pub const PRODUCT: &str = r#"package models

import "time"

type Product struct {
	// strata: primaryKey; autoIncrement
	ID uint `json:"id"`

	// strata: required; unique
	Name string `json:"name"`

	// strata: min:0
	Age int `json:"age"`

	CreatedAt time.Time `json:"created_at"`
}
"#;

pub const PRODUCT_WITH_BIO: &str = r#"package models

import "time"

type Product struct {
	// strata: primaryKey; autoIncrement
	ID uint `json:"id"`

	// strata: required; unique
	Name string `json:"name"`

	// strata: min:0
	Age int `json:"age"`

	CreatedAt time.Time `json:"created_at"`

	Bio string `json:"bio"`
}
"#;

pub const POST: &str = r#"package models

// Post is a blog entry.
type Post struct {
	// strata: primaryKey; autoIncrement
	ID int64 `json:"id"`

	// strata: required; index
	Title string `json:"title"`

	// strata: relation:hasMany; model:Comment
	Comments []Comment `json:"comments"`
}
"#;

pub async fn sqlite() -> SqliteDatabase {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    SqliteDatabase::from_pool(pool)
}

/// A temporary migrations directory.
pub fn migrations_dir() -> (TempDir, MigrationDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let dir = MigrationDir::new(tmp.path().join("migrations"));
    (tmp, dir)
}

/// Writes `<version>_<description>.sql` and returns its name.
pub fn write_migration(dir: &MigrationDir, version: &str, description: &str, up: &str, down: &str) -> String {
    let name = format!("{version}_{description}.sql");
    let generated_at = NaiveDate::from_ymd_opt(2026, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let file = MigrationFile::parse(&name, MigrationFile::render(&name, up, down, generated_at));
    dir.write(&file).unwrap_or_else(|e| panic!("Failed to write {name}: {e}"));
    name
}

/// Writes a Go file under `root`, creating parent directories.
pub fn write_model(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

pub async fn table_exists(db: &SqliteDatabase, table: &str) -> bool {
    db.list_tables().await.unwrap().iter().any(|t| t == table)
}

/// SQLite database that can be told to fail.
pub struct FakeDatabase {
    pub inner: SqliteDatabase,
    /// Statements containing this text fail.
    pub fail_on: Option<String>,
    pub fail_introspection: bool,
    pub executed: Mutex<Vec<String>>,
}

impl FakeDatabase {
    pub async fn new() -> Self {
        Self {
            inner: sqlite().await,
            fail_on: None,
            fail_introspection: false,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        if self.fail_on.as_deref().is_some_and(|needle| sql.contains(needle)) {
            return Err(MigrateError::Database(sqlx::Error::Protocol(format!(
                "refusing to run: {sql}"
            ))));
        }
        self.executed.lock().unwrap().push(sql.to_string());
        self.inner.execute(sql).await
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        if self.fail_introspection {
            return Err(MigrateError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.list_tables().await
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnSchema>> {
        self.inner.describe_table(table).await
    }

    async fn fetch_history(&self) -> Result<Vec<MigrationRecord>> {
        self.inner.fetch_history().await
    }

    async fn insert_history(&self, name: &str, batch: i32) -> Result<()> {
        self.inner.insert_history(name, batch).await
    }

    async fn delete_history(&self, name: &str) -> Result<()> {
        self.inner.delete_history(name).await
    }
}
