//! Batched SQL migrations generated from annotated Go models.
//!
//! `strata-migrate` is the half of strata that touches a database or the
//! filesystem:
//!
//! - **Config** - Connection settings from the `DB_*` environment variables
//! - **Database** - One async trait over MySQL, PostgreSQL and SQLite pools
//! - **Introspect** - Reads the live schema through the database's catalog
//! - **Detector** - Scans `models/` directories and diffs them against the schema
//! - **Migration files** - Timestamped `.sql` files with UP and DOWN sections
//! - **Runner** - Applies and reverts files, tracking batches in a control table
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_core::SqlGenerator;
//! use strata_migrate::prelude::*;
//!
//! # async fn run() -> strata_migrate::Result<()> {
//! let config = DatabaseConfig::from_env()?;
//! let db = connect(&config).await?;
//!
//! let changes = ChangeDetector::new("modules").detect(Some(db.as_ref())).await;
//! let sql = SqlGenerator::new(db.dialect()).generate(&changes);
//! let file = MigrationFile::new("sync models", &sql.up, &sql.down, chrono::Local::now().naive_local());
//!
//! let dir = MigrationDir::new("migrations");
//! dir.write(&file)?;
//!
//! let applied = MigrationRunner::new(db.as_ref(), dir).migrate_up(0).await?;
//! println!("applied {applied} migration(s)");
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate a migration from model changes
//! strata makemigrations --name add_products
//!
//! # Apply pending migrations
//! strata migrate up
//!
//! # Revert the last migration of the newest batch
//! strata migrate down
//!
//! # Show applied and pending migrations
//! strata migrate status
//! ```

pub mod config;
pub mod database;
pub mod detector;
pub mod error;
pub mod history;
pub mod introspect;
pub mod migration_file;
pub mod runner;

pub use error::{MigrateError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::DatabaseConfig;
    pub use crate::database::{
        connect, Database, MySqlDatabase, PostgresDatabase, SqliteDatabase,
    };
    pub use crate::detector::ChangeDetector;
    pub use crate::error::{MigrateError, Result};
    pub use crate::history::MigrationRecord;
    pub use crate::introspect::introspect;
    pub use crate::migration_file::{split_sql_statements, MigrationDir, MigrationFile};
    pub use crate::runner::{MigrationEntry, MigrationRunner, MigrationStatus};
}
