//! Change detection from a tree of model files.

use std::path::{Path, PathBuf};

use strata_core::{parse_model_file, EntityMetadata, SchemaChange, SchemaDiffer};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::database::Database;
use crate::introspect::introspect;

/// Name of the directories whose `.go` files are models.
pub const MODELS_DIR_NAME: &str = "models";

/// Scans model files and compares them against a database.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    models_dir: PathBuf,
}

impl ChangeDetector {
    /// Creates a detector rooted at `models_dir`.
    #[must_use]
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Root of the scanned tree.
    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Parses every model file under the root, in file-name order.
    ///
    /// Only `.go` files directly inside a directory named `models` count.
    /// Files that fail to parse are skipped with a warning.
    #[must_use]
    pub fn scan_models(&self) -> Vec<EntityMetadata> {
        let mut entities = Vec::new();

        for entry in WalkDir::new(&self.models_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Cannot read models directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_model_file(entry.path()) {
                continue;
            }

            match parse_model_file(entry.path()) {
                Ok(entity) => {
                    debug!(
                        entity = %entity.name,
                        table = %entity.table_name,
                        path = %entry.path().display(),
                        "Parsed model"
                    );
                    entities.push(entity);
                }
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Skipping model file"),
            }
        }

        entities
    }

    /// Detects the schema changes needed to bring the database in line with
    /// the models.
    ///
    /// Without a database, or when its schema cannot be read, every model is
    /// treated as a new table.
    pub async fn detect(&self, db: Option<&dyn Database>) -> Vec<SchemaChange> {
        let entities = self.scan_models();
        if entities.is_empty() {
            info!(path = %self.models_dir.display(), "No models found");
            return Vec::new();
        }

        let Some(db) = db else {
            return SchemaDiffer::all_new(&entities);
        };

        match introspect(db).await {
            Ok(schema) => SchemaDiffer::new(db.dialect()).diff(&entities, &schema),
            Err(e) => {
                warn!(error = %e, "Introspection failed, treating every model as new");
                SchemaDiffer::all_new(&entities)
            }
        }
    }
}

fn is_model_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
        && path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|dir| dir == MODELS_DIR_NAME)
}
