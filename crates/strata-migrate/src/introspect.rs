//! Reading the live schema.

use strata_core::{DatabaseSchema, TableSchema, HISTORY_TABLE};
use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{MigrateError, Result};

/// Reads every user table and its columns.
///
/// The control table is excluded. A table whose columns cannot be read is
/// left out with a warning; only a failure to list tables is an error.
pub async fn introspect(db: &dyn Database) -> Result<DatabaseSchema> {
    let tables = db
        .list_tables()
        .await
        .map_err(|e| MigrateError::Introspection(e.to_string()))?;

    let mut schema = DatabaseSchema::new();
    for table in tables {
        if table == HISTORY_TABLE {
            continue;
        }
        match db.describe_table(&table).await {
            Ok(columns) => {
                debug!(table = %table, columns = columns.len(), "Introspected table");
                schema.insert(TableSchema::new(table, columns));
            }
            Err(e) => warn!(table = %table, error = %e, "Skipping table that could not be described"),
        }
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteDatabase;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn database() -> SqliteDatabase {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        SqliteDatabase::from_pool(pool)
    }

    #[tokio::test]
    async fn test_history_table_excluded() {
        let db = database().await;
        db.ensure_history_table().await.unwrap();
        db.execute("CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .await
            .unwrap();

        let schema = introspect(&db).await.unwrap();
        assert_eq!(schema.len(), 1);
        let products = schema.table("products").unwrap();
        assert!(products.column("id").unwrap().is_primary_key);
        assert!(!products.column("name").unwrap().nullable);
    }

    #[tokio::test]
    async fn test_empty_database() {
        let schema = introspect(&database().await).await.unwrap();
        assert!(schema.is_empty());
    }
}
