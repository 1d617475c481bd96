//! Error types for migration detection and execution.

use strata_core::ParseError;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A model file could not be parsed.
    #[error("Model parse error: {0}")]
    Parse(#[from] ParseError),

    /// Database error outside of migration execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading/writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `DB_DRIVER` names a backend that is not supported.
    #[error("Unsupported database driver '{0}' (expected mysql, postgres or sqlite)")]
    UnsupportedDialect(String),

    /// Invalid connection settings.
    #[error("Invalid database configuration: {0}")]
    Config(String),

    /// The live schema could not be read.
    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    /// No file on disk for a recorded or requested migration.
    #[error("Migration file not found: {0}")]
    MigrationFileNotFound(String),

    /// A migration file lacks its UP or DOWN section.
    #[error("Migration '{migration}' has no {section} section")]
    MissingSection {
        /// File name of the migration.
        migration: String,
        /// `UP` or `DOWN`.
        section: &'static str,
    },

    /// A statement failed while applying or reverting a migration.
    #[error("Migration '{migration}' failed: {source}\nSQL: {statement}")]
    Execution {
        /// File name of the migration.
        migration: String,
        /// The statement that failed.
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    /// `migrate down` found no applied migrations.
    #[error("No migrations to revert")]
    NothingToRevert,

    /// The control table has no record for a migration being reverted.
    #[error("No history record for migration '{0}'")]
    HistoryRecordMissing(String),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
