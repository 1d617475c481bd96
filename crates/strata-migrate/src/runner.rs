//! Applying and reverting migration files.
//!
//! Migrations move between two states: pending (a file with no control
//! table record) and applied (a record with a batch number). Every
//! `migrate_up` call applies its migrations under one new batch number;
//! `migrate_down` reverts from the newest batch only.
//!
//! Statements run one at a time without a wrapping transaction. A failing
//! statement aborts the call, and whatever ran before it stays applied.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::database::Database;
use crate::error::{MigrateError, Result};
use crate::history::{last_batch, MigrationRecord};
use crate::migration_file::{split_sql_statements, MigrationDir, MigrationVersion};

/// One line of `migrate status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationEntry {
    /// Migration file name.
    pub name: String,
    #[serde(flatten)]
    pub version: MigrationVersion,
    /// Batch, for applied migrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<i32>,
    /// When it was applied, for applied migrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

impl MigrationEntry {
    fn applied(record: &MigrationRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: MigrationVersion::from_file_name(&record.name),
            batch: Some(record.batch),
            executed_at: Some(record.executed_at),
        }
    }

    fn pending(name: String) -> Self {
        Self {
            version: MigrationVersion::from_file_name(&name),
            name,
            batch: None,
            executed_at: None,
        }
    }
}

/// Applied migrations (oldest first) and pending ones (file name order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub applied: Vec<MigrationEntry>,
    pub pending: Vec<MigrationEntry>,
}

/// Runs migrations from a directory against one database.
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
    dir: MigrationDir,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a runner for the migrations in `dir`.
    #[must_use]
    pub fn new(db: &'a dyn Database, dir: MigrationDir) -> Self {
        Self { db, dir }
    }

    /// The migrations directory.
    #[must_use]
    pub const fn dir(&self) -> &MigrationDir {
        &self.dir
    }

    /// Applies pending migrations in file name order, all under one new
    /// batch. `steps` limits how many; 0 applies all.
    ///
    /// Returns the number applied. Nothing pending is not an error.
    pub async fn migrate_up(&self, steps: usize) -> Result<usize> {
        self.db.ensure_history_table().await?;

        let records = self.db.fetch_history().await?;
        let mut pending = self.pending_names(&records)?;
        if steps > 0 {
            pending.truncate(steps);
        }
        if pending.is_empty() {
            info!("Nothing to migrate");
            return Ok(0);
        }

        let batch = last_batch(&records) + 1;
        for name in &pending {
            info!(migration = %name, batch, "Applying migration");
            let file = self.dir.read(name)?;
            let up = file.up_sql().ok_or_else(|| MigrateError::MissingSection {
                migration: name.clone(),
                section: "UP",
            })?;
            self.execute(name, up).await?;
            self.db.insert_history(name, batch).await?;
            info!(migration = %name, batch, "Migration applied successfully");
        }

        Ok(pending.len())
    }

    /// Reverts up to `steps` migrations of the newest batch, newest first.
    /// 0 reverts the whole batch.
    ///
    /// Fails with [`MigrateError::NothingToRevert`] when nothing is applied.
    pub async fn migrate_down(&self, steps: usize) -> Result<usize> {
        self.db.ensure_history_table().await?;

        let records = self.db.fetch_history().await?;
        let batch = last_batch(&records);
        let mut to_revert: Vec<&MigrationRecord> =
            records.iter().rev().filter(|r| r.batch == batch).collect();
        if to_revert.is_empty() {
            return Err(MigrateError::NothingToRevert);
        }
        if steps > 0 {
            to_revert.truncate(steps);
        }

        for record in &to_revert {
            self.revert(record).await?;
        }
        Ok(to_revert.len())
    }

    /// Reverts, newest first, every migration applied after the one whose
    /// name starts with `version`. The matching migration stays applied.
    ///
    /// If no applied migration matches, everything is reverted.
    pub async fn migrate_down_to(&self, version: &str) -> Result<usize> {
        self.db.ensure_history_table().await?;

        let records = self.db.fetch_history().await?;
        let to_revert: Vec<&MigrationRecord> = records
            .iter()
            .rev()
            .take_while(|r| !r.name.starts_with(version))
            .collect();
        if to_revert.is_empty() {
            info!(version = %version, "Nothing newer than target version");
        }

        for record in &to_revert {
            self.revert(record).await?;
        }
        Ok(to_revert.len())
    }

    /// Applied and pending migrations.
    pub async fn status(&self) -> Result<MigrationStatus> {
        self.db.ensure_history_table().await?;

        let records = self.db.fetch_history().await?;
        let pending = self.pending_names(&records)?;

        Ok(MigrationStatus {
            applied: records.iter().map(MigrationEntry::applied).collect(),
            pending: pending.into_iter().map(MigrationEntry::pending).collect(),
        })
    }

    fn pending_names(&self, records: &[MigrationRecord]) -> Result<Vec<String>> {
        let applied: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
        Ok(self
            .dir
            .list()?
            .into_iter()
            .filter(|name| !applied.contains(name.as_str()))
            .collect())
    }

    async fn revert(&self, record: &MigrationRecord) -> Result<()> {
        info!(migration = %record.name, batch = record.batch, "Reverting migration");
        let file = self.dir.read(&record.name)?;
        let down = file.down_sql().ok_or_else(|| MigrateError::MissingSection {
            migration: record.name.clone(),
            section: "DOWN",
        })?;
        self.execute(&record.name, down).await?;
        self.db.delete_history(&record.name).await?;
        info!(migration = %record.name, "Migration reverted successfully");
        Ok(())
    }

    async fn execute(&self, migration: &str, sql: &str) -> Result<()> {
        for statement in split_sql_statements(sql) {
            debug!(sql = %statement, "Executing SQL");
            self.db
                .execute(&statement)
                .await
                .map_err(|e| match e {
                    MigrateError::Database(source) => MigrateError::Execution {
                        migration: migration.to_string(),
                        statement: statement.clone(),
                        source,
                    },
                    other => other,
                })?;
        }
        Ok(())
    }
}
