//! Migration files on disk.
//!
//! A migration is a `.sql` file named `<YYYYMMDDHHMMSS>_<description>.sql`
//! holding an UP and a DOWN section:
//!
//! ```text
//! -- Migration: 20260301120000_create_products.sql
//! -- Generated at: 2026-03-01 12:00:00
//!
//! -- ========== UP ==========
//! CREATE TABLE ...;
//!
//! -- ========== DOWN ==========
//! DROP TABLE IF EXISTS products;
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use strata_core::naming::snake_case;
use tracing::warn;

use crate::error::{MigrateError, Result};

/// Line that opens the UP section.
pub const UP_MARKER: &str = "-- ========== UP ==========";
/// Line that opens the DOWN section.
pub const DOWN_MARKER: &str = "-- ========== DOWN ==========";
/// `strftime` format of the version prefix.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";
/// Description used when none is given.
pub const DEFAULT_DESCRIPTION: &str = "auto_migration";

const EXTENSION: &str = "sql";

/// A migration file: its name and full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub name: String,
    pub content: String,
}

impl MigrationFile {
    /// Builds a new migration generated at `generated_at`.
    #[must_use]
    pub fn new(description: &str, up: &str, down: &str, generated_at: NaiveDateTime) -> Self {
        let name = file_name(description, generated_at);
        let content = Self::render(&name, up, down, generated_at);
        Self { name, content }
    }

    /// Renders the file text.
    #[must_use]
    pub fn render(name: &str, up: &str, down: &str, generated_at: NaiveDateTime) -> String {
        format!(
            "-- Migration: {name}\n-- Generated at: {}\n\n{UP_MARKER}\n{up}\n\n{DOWN_MARKER}\n{down}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Wraps text read from disk.
    #[must_use]
    pub fn parse(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Text between the UP marker and the DOWN marker (or the end).
    ///
    /// `None` if the marker is missing or the section is blank.
    #[must_use]
    pub fn up_sql(&self) -> Option<&str> {
        let start = self.content.find(UP_MARKER)? + UP_MARKER.len();
        let end = self
            .content
            .find(DOWN_MARKER)
            .filter(|&down| down >= start)
            .unwrap_or(self.content.len());
        non_blank(&self.content[start..end])
    }

    /// Text after the DOWN marker.
    ///
    /// `None` if the marker is missing or the section is blank.
    #[must_use]
    pub fn down_sql(&self) -> Option<&str> {
        let start = self.content.find(DOWN_MARKER)? + DOWN_MARKER.len();
        non_blank(&self.content[start..])
    }
}

fn non_blank(section: &str) -> Option<&str> {
    let section = section.trim();
    (!section.is_empty()).then_some(section)
}

/// File name for a migration generated at `generated_at`.
#[must_use]
pub fn file_name(description: &str, generated_at: NaiveDateTime) -> String {
    let description = snake_case(description.trim());
    let description = if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    };
    format!(
        "{}_{description}.{EXTENSION}",
        generated_at.format(VERSION_FORMAT)
    )
}

/// Version and human description of a migration file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationVersion {
    /// `20260301120000`, or `20260301_120000` for legacy names.
    pub version: String,
    /// Description with underscores turned into spaces.
    pub description: String,
}

impl MigrationVersion {
    /// Parses `<version>_<description>.sql`.
    ///
    /// Names that follow neither the 14-digit nor the legacy
    /// `YYYYMMDD_HHMMSS_` form keep the whole stem as the version.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_name
            .strip_suffix(".sql")
            .unwrap_or(file_name);
        let parts: Vec<&str> = stem.splitn(3, '_').collect();

        let (version, description) = match parts.as_slice() {
            [date, time, rest] if is_digits(date, 8) && is_digits(time, 6) => {
                (format!("{date}_{time}"), *rest)
            }
            [version, ..] if is_digits(version, 14) => {
                (
                    (*version).to_string(),
                    stem.get(version.len() + 1..).unwrap_or_default(),
                )
            }
            _ => (stem.to_string(), ""),
        };

        Self {
            version,
            description: description.replace('_', " "),
        }
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// The directory holding migration files.
#[derive(Debug, Clone)]
pub struct MigrationDir {
    path: PathBuf,
}

impl MigrationDir {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the `.sql` files, sorted. A missing directory has none.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file()
                || !path.extension().is_some_and(|ext| ext == EXTENSION)
            {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads the migration called `name`.
    pub fn read(&self, name: &str) -> Result<MigrationFile> {
        let path = self.path.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(MigrationFile::parse(name, content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(MigrateError::MigrationFileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a new migration, creating the directory if needed.
    ///
    /// An existing file with the same name is never overwritten.
    pub fn write(&self, migration: &MigrationFile) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)?;
        let path = self.path.join(&migration.name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(migration.content.as_bytes())?;
        Ok(path)
    }
}

/// Splits SQL text into statements on `;`.
///
/// Semicolons inside quoted strings, quoted identifiers, `--` comments and
/// `/* */` comments do not split. Quotes may be escaped with a backslash or
/// by doubling them. Fragments that are empty or only comments are dropped.
#[must_use]
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                if chars.peek() == Some(&q) {
                    current.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                has_code = true;
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                current.push(c);
                for next in chars.by_ref() {
                    current.push(next);
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                current.push(c);
                current.extend(chars.next());
                let mut prev = ' ';
                for next in chars.by_ref() {
                    current.push(next);
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            ';' => {
                push_statement(&mut statements, &current, has_code);
                current.clear();
                has_code = false;
            }
            _ => {
                has_code |= !c.is_whitespace();
                current.push(c);
            }
        }
    }
    push_statement(&mut statements, &current, has_code);
    statements
}

fn push_statement(statements: &mut Vec<String>, fragment: &str, has_code: bool) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    if !has_code {
        warn!(comment = %fragment, "Skipping comment (unsupported operation)");
        return;
    }
    statements.push(fragment.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 5))
            .unwrap()
    }

    #[test]
    fn test_render_exact_layout() {
        let file = MigrationFile::new("create products", "CREATE TABLE p (id INT);", "DROP TABLE p;", at());
        assert_eq!(file.name, "20260301123005_create_products.sql");
        assert_eq!(
            file.content,
            "-- Migration: 20260301123005_create_products.sql\n\
             -- Generated at: 2026-03-01 12:30:05\n\
             \n\
             -- ========== UP ==========\n\
             CREATE TABLE p (id INT);\n\
             \n\
             -- ========== DOWN ==========\n\
             DROP TABLE p;\n"
        );
        assert_eq!(file.up_sql(), Some("CREATE TABLE p (id INT);"));
        assert_eq!(file.down_sql(), Some("DROP TABLE p;"));
    }

    #[test]
    fn test_default_description() {
        assert_eq!(file_name("  ", at()), "20260301123005_auto_migration.sql");
        assert_eq!(file_name("AddBio", at()), "20260301123005_add_bio.sql");
    }

    #[test]
    fn test_missing_sections() {
        let file = MigrationFile::parse("x.sql", "SELECT 1;");
        assert_eq!(file.up_sql(), None);
        assert_eq!(file.down_sql(), None);

        let file = MigrationFile::parse("x.sql", format!("{UP_MARKER}\n\n{DOWN_MARKER}\nDROP TABLE t;"));
        assert_eq!(file.up_sql(), None);
        assert_eq!(file.down_sql(), Some("DROP TABLE t;"));

        let file = MigrationFile::parse("x.sql", format!("{UP_MARKER}\nCREATE TABLE t (id INT);\n"));
        assert_eq!(file.up_sql(), Some("CREATE TABLE t (id INT);"));
        assert_eq!(file.down_sql(), None);
    }

    #[test]
    fn test_version_parsing() {
        let v = MigrationVersion::from_file_name("20260301123005_create_products.sql");
        assert_eq!(v.version, "20260301123005");
        assert_eq!(v.description, "create products");

        let v = MigrationVersion::from_file_name("20260301_123005_add_bio_column.sql");
        assert_eq!(v.version, "20260301_123005");
        assert_eq!(v.description, "add bio column");

        let v = MigrationVersion::from_file_name("seed.sql");
        assert_eq!(v.version, "seed");
        assert_eq!(v.description, "");
    }

    #[test]
    fn test_split_respects_quotes() {
        let statements = split_sql_statements(
            "INSERT INTO t VALUES ('a;b');\nINSERT INTO t VALUES (\"c;d\"); SELECT `x;y` FROM t",
        );
        assert_eq!(
            statements,
            [
                "INSERT INTO t VALUES ('a;b')",
                "INSERT INTO t VALUES (\"c;d\")",
                "SELECT `x;y` FROM t",
            ]
        );
    }

    #[test]
    fn test_split_escapes() {
        let statements =
            split_sql_statements("SELECT 'it''s;fine'; SELECT 'back\\';slash'; SELECT 1");
        assert_eq!(
            statements,
            ["SELECT 'it''s;fine'", "SELECT 'back\\';slash'", "SELECT 1"]
        );
    }

    #[test]
    fn test_split_drops_comments_and_blanks() {
        let statements = split_sql_statements(
            "ALTER TABLE t ADD COLUMN a INT;\n\n;;\n-- SQLite cannot do this; recreate the table\n\n-- Drop it manually",
        );
        assert_eq!(statements, ["ALTER TABLE t ADD COLUMN a INT"]);
    }

    #[test]
    fn test_split_keeps_commented_statement() {
        let statements = split_sql_statements("-- it's a note\nCREATE TABLE t (id INT);");
        assert_eq!(statements, ["-- it's a note\nCREATE TABLE t (id INT)"]);
    }

    #[test]
    fn test_split_block_comments() {
        let statements = split_sql_statements(
            "SELECT 1; /* x; y */ SELECT 2;\n/* trailing; note */;\nSELECT 3 /*/;*/",
        );
        assert_eq!(
            statements,
            ["SELECT 1", "/* x; y */ SELECT 2", "SELECT 3 /*/;*/"]
        );
    }

    #[test]
    fn test_dir_list_write_read() {
        let tmp = TempDir::new().unwrap();
        let dir = MigrationDir::new(tmp.path().join("migrations"));
        assert!(dir.list().unwrap().is_empty());

        let second = MigrationFile::new("b", "SELECT 2;", "SELECT 2;", at());
        let first = MigrationFile::parse("20250101000000_a.sql", "SELECT 1;");
        dir.write(&second).unwrap();
        dir.write(&first).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            dir.list().unwrap(),
            ["20250101000000_a.sql", "20260301123005_b.sql"]
        );
        assert_eq!(dir.read(&second.name).unwrap(), second);
        assert!(dir.write(&second).is_err());
        assert!(matches!(
            dir.read("missing.sql"),
            Err(MigrateError::MigrationFileNotFound(name)) if name == "missing.sql"
        ));
    }
}
