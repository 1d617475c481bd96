//! Database connection settings.
//!
//! Settings come from the `DB_*` environment variables. Connection options
//! are built with sqlx's typed builders for each backend.

use std::path::PathBuf;
use std::str::FromStr;

use sqlx::mysql::MySqlConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::sqlite::SqliteConnectOptions;
use strata_core::Dialect;

use crate::error::{MigrateError, Result};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_SQLITE_FILE: &str = "strata.db";

/// Connection parameters for the target database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `mysql`, `postgres` or `sqlite`.
    pub driver: String,
    pub host: String,
    /// Port; the backend default when unset.
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    /// Database name. For SQLite, the file stem.
    pub name: String,
    /// PostgreSQL `sslmode` (`disable`, `require`, ...).
    pub sslmode: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: Dialect::default().as_str().to_string(),
            host: DEFAULT_HOST.to_string(),
            port: None,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            sslmode: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Reads the configuration from `DB_DRIVER`, `DB_HOST`, `DB_PORT`,
    /// `DB_USER`, `DB_PASSWORD`, `DB_NAME` and `DB_SSLMODE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("DB_PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                MigrateError::Config(format!("DB_PORT '{raw}' is not a valid port: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            driver: get("DB_DRIVER").unwrap_or(defaults.driver),
            host: get("DB_HOST").unwrap_or(defaults.host),
            port,
            user: get("DB_USER").unwrap_or_default(),
            password: get("DB_PASSWORD").unwrap_or_default(),
            name: get("DB_NAME").unwrap_or_default(),
            sslmode: get("DB_SSLMODE").unwrap_or_default(),
        })
    }

    /// Resolves the driver name to a dialect.
    pub fn dialect(&self) -> Result<Dialect> {
        Dialect::from_str(&self.driver).map_err(|e| MigrateError::UnsupportedDialect(e.0))
    }

    /// Path of the SQLite database file.
    #[must_use]
    pub fn sqlite_path(&self) -> PathBuf {
        if self.name.is_empty() {
            PathBuf::from(DEFAULT_SQLITE_FILE)
        } else {
            PathBuf::from(format!("{}.db", self.name))
        }
    }

    /// MySQL connection options.
    #[must_use]
    pub fn mysql_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port.unwrap_or(3306))
            .username(&self.user)
            .charset("utf8mb4");
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if !self.name.is_empty() {
            options = options.database(&self.name);
        }
        options
    }

    /// PostgreSQL connection options.
    pub fn postgres_options(&self) -> Result<PgConnectOptions> {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port.unwrap_or(5432))
            .username(&self.user);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if !self.name.is_empty() {
            options = options.database(&self.name);
        }
        if !self.sslmode.is_empty() {
            let mode = PgSslMode::from_str(&self.sslmode).map_err(|e| {
                MigrateError::Config(format!("DB_SSLMODE '{}': {e}", self.sslmode))
            })?;
            options = options.ssl_mode(mode);
        }
        Ok(options)
    }

    /// SQLite connection options. The file is created if missing.
    #[must_use]
    pub fn sqlite_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(self.sqlite_path())
            .create_if_missing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DatabaseConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DatabaseConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.driver, "mysql");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, None);
        assert_eq!(config.dialect().unwrap(), Dialect::MySql);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = config(&[
            ("DB_DRIVER", "postgres"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "shop"),
            ("DB_SSLMODE", "disable"),
        ])
        .unwrap();
        assert_eq!(config.dialect().unwrap(), Dialect::Postgres);
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, Some(6543));
        assert_eq!(config.name, "shop");
        assert!(config.postgres_options().is_ok());
    }

    #[test]
    fn test_empty_driver_means_default() {
        let config = config(&[("DB_DRIVER", "  ")]).unwrap();
        assert_eq!(config.dialect().unwrap(), Dialect::MySql);
    }

    #[test]
    fn test_unknown_driver() {
        let config = config(&[("DB_DRIVER", "oracle")]).unwrap();
        assert!(matches!(
            config.dialect(),
            Err(MigrateError::UnsupportedDialect(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            config(&[("DB_PORT", "not-a-port")]),
            Err(MigrateError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_sslmode() {
        let config = config(&[("DB_DRIVER", "postgres"), ("DB_SSLMODE", "sometimes")]).unwrap();
        assert!(matches!(
            config.postgres_options(),
            Err(MigrateError::Config(_))
        ));
    }

    #[test]
    fn test_sqlite_path() {
        assert_eq!(config(&[]).unwrap().sqlite_path(), PathBuf::from("strata.db"));
        assert_eq!(
            config(&[("DB_NAME", "shop")]).unwrap().sqlite_path(),
            PathBuf::from("shop.db")
        );
    }
}
