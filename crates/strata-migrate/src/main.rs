//! strata CLI
//!
//! Command-line tool for generating and running migrations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strata_core::{Dialect, SqlGenerator};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use strata_migrate::prelude::*;

/// Schema migrations generated from annotated Go models.
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory scanned for `models/*.go` files.
    #[arg(long, default_value = "modules")]
    models_dir: PathBuf,

    /// Migrations directory.
    #[arg(short, long, default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings; each falls back to its `DB_*` variable.
#[derive(Args)]
struct DbArgs {
    /// Database driver: mysql (default), postgres or sqlite.
    #[arg(long = "db-driver", env = "DB_DRIVER")]
    driver: Option<String>,

    /// Database host (default localhost).
    #[arg(long = "db-host", env = "DB_HOST")]
    host: Option<String>,

    #[arg(long = "db-port", env = "DB_PORT")]
    port: Option<String>,

    #[arg(long = "db-user", env = "DB_USER")]
    user: Option<String>,

    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Database name (SQLite: file stem).
    #[arg(long = "db-name", env = "DB_NAME")]
    name: Option<String>,

    /// PostgreSQL sslmode.
    #[arg(long = "db-sslmode", env = "DB_SSLMODE")]
    sslmode: Option<String>,
}

impl DbArgs {
    fn lookup(&self, key: &str) -> Option<String> {
        let value = match key {
            "DB_DRIVER" => &self.driver,
            "DB_HOST" => &self.host,
            "DB_PORT" => &self.port,
            "DB_USER" => &self.user,
            "DB_PASSWORD" => &self.password,
            "DB_NAME" => &self.name,
            "DB_SSLMODE" => &self.sslmode,
            _ => return None,
        };
        value.clone()
    }

    fn into_config(self) -> strata_migrate::Result<DatabaseConfig> {
        DatabaseConfig::from_lookup(|key| self.lookup(key))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a migration from differences between models and database.
    #[command(name = "makemigrations")]
    MakeMigrations {
        /// Migration description.
        #[arg(short, long)]
        name: Option<String>,

        /// Print the SQL without writing a file.
        #[arg(long)]
        dry_run: bool,

        /// With --dry-run, print the detected changes as JSON.
        #[arg(long, requires = "dry_run")]
        json: bool,
    },

    /// Apply, revert or inspect migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply pending migrations.
    Up {
        /// Number of migrations to apply (all if 0).
        #[arg(short, long, default_value_t = 0)]
        steps: usize,
    },

    /// Revert migrations of the newest batch.
    Down {
        /// Number of migrations to revert (whole batch if 0).
        #[arg(short, long, default_value_t = 1)]
        steps: usize,

        /// Revert everything applied after this version.
        #[arg(long)]
        to: Option<String>,
    },

    /// Show applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.db.into_config()?;
    let dir = MigrationDir::new(&cli.migrations_dir);

    match cli.command {
        Commands::MakeMigrations {
            name,
            dry_run,
            json,
        } => {
            let db = match connect(&config).await {
                Ok(db) => Some(db),
                Err(e) => {
                    warn!(error = %e, "Cannot connect to database, treating every model as new");
                    None
                }
            };
            let dialect = match &db {
                Some(db) => db.dialect(),
                None => config.dialect().unwrap_or_else(|e| {
                    warn!(error = %e, "Generating SQL for the default dialect");
                    Dialect::default()
                }),
            };

            let changes = ChangeDetector::new(&cli.models_dir)
                .detect(db.as_deref())
                .await;
            if changes.is_empty() {
                info!("No changes detected.");
                return Ok(());
            }

            if dry_run && json {
                println!("{}", serde_json::to_string_pretty(&changes)?);
                return Ok(());
            }

            println!("\nDetected changes:");
            for change in &changes {
                println!("  - {}", change.description);
            }

            let sql = SqlGenerator::new(dialect).generate(&changes);
            if dry_run {
                println!("\n-- UP\n{}\n\n-- DOWN\n{}", sql.up, sql.down);
                return Ok(());
            }

            let file = MigrationFile::new(
                name.as_deref().unwrap_or_default(),
                &sql.up,
                &sql.down,
                chrono::Local::now().naive_local(),
            );
            let path = dir.write(&file)?;
            info!("Created migration: {}", path.display());
        }

        Commands::Migrate { action } => {
            let db = connect(&config).await?;
            let runner = MigrationRunner::new(db.as_ref(), dir);

            match action {
                MigrateAction::Up { steps } => {
                    let applied = runner.migrate_up(steps).await?;
                    info!("Applied {applied} migration(s).");
                }

                MigrateAction::Down { steps, to } => {
                    let reverted = match to {
                        Some(version) => runner.migrate_down_to(&version).await?,
                        None => match runner.migrate_down(steps).await {
                            Err(MigrateError::NothingToRevert) => {
                                info!("No migrations to revert.");
                                return Ok(());
                            }
                            other => other?,
                        },
                    };
                    info!("Reverted {reverted} migration(s).");
                }

                MigrateAction::Status => {
                    let status = runner.status().await?;

                    if status.applied.is_empty() && status.pending.is_empty() {
                        info!("No migrations found.");
                        return Ok(());
                    }

                    println!("\nMigrations:");
                    println!("{:-<60}", "");
                    for entry in &status.applied {
                        let executed_at = entry
                            .executed_at
                            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_default();
                        println!(
                            " [X] {} {} (batch {}, {executed_at})",
                            entry.version.version,
                            entry.version.description,
                            entry.batch.unwrap_or_default()
                        );
                    }
                    for entry in &status.pending {
                        println!(
                            " [ ] {} {}",
                            entry.version.version, entry.version.description
                        );
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}
