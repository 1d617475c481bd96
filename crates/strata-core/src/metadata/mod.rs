//! Entity metadata extracted from annotated Go model files.

mod validate;

pub use validate::ValidationError;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotations::{self, Clause, IgnoreScope, RelationKind, ValidationRule};
use crate::ast::FieldDecl;
use crate::error::ParseError;
use crate::naming;
use crate::parser;

/// A parsed model: one Go struct mapped to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Struct name.
    pub name: String,
    /// Go package the struct lives in.
    pub package: String,
    /// Target table.
    pub table_name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldMetadata>,
    /// Import paths of the source file.
    pub imports: Vec<String>,
}

impl EntityMetadata {
    /// Looks up a field by its Go name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that map to a physical column, in declaration order.
    pub fn persisted_fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|f| f.is_persisted())
    }
}

/// Relationship declared on a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetadata {
    pub kind: Option<RelationKind>,
    pub foreign_key: Option<String>,
    pub through: Option<String>,
    pub model: Option<String>,
}

/// Metadata of one struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Go field name.
    pub name: String,
    /// Declared Go type, rendered (`string`, `*time.Time`, `[]byte`).
    pub go_type: String,
    /// Upper-cased methods the field may be written in. Empty means all.
    pub writable: Vec<String>,
    pub readable: bool,
    pub required: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub indexed: bool,
    pub validations: BTreeMap<ValidationRule, String>,
    pub relation: Option<RelationMetadata>,
    /// Name from the `json` tag, options stripped.
    pub serialization_name: String,
    /// Raw `gorm` tag.
    pub storage_directive: String,
    pub default_value: Option<String>,
    pub ignore: bool,
    pub ignore_write: bool,
    pub ignore_read: bool,
}

impl FieldMetadata {
    /// Creates metadata for an unannotated field. Fields are readable by
    /// default.
    #[must_use]
    pub fn new(name: impl Into<String>, go_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            go_type: go_type.into(),
            writable: Vec::new(),
            readable: true,
            required: false,
            unique: false,
            primary_key: false,
            auto_increment: false,
            indexed: false,
            validations: BTreeMap::new(),
            relation: None,
            serialization_name: String::new(),
            storage_directive: String::new(),
            default_value: None,
            ignore: false,
            ignore_write: false,
            ignore_read: false,
        }
    }

    /// Applies one annotation clause.
    pub fn apply(&mut self, clause: Clause) {
        match clause {
            Clause::Writable(methods) => self.writable = methods,
            Clause::Ignore(IgnoreScope::All) => self.ignore = true,
            Clause::Ignore(IgnoreScope::Write) => self.ignore_write = true,
            Clause::Ignore(IgnoreScope::Read) => self.ignore_read = true,
            Clause::Validation(rule, value) => {
                self.validations.insert(rule, value);
            }
            Clause::Default(value) => self.default_value = Some(value),
            Clause::Relation(kind) => self.relation_mut().kind = Some(kind),
            Clause::ForeignKey(column) => self.relation_mut().foreign_key = Some(column),
            Clause::Through(table) => self.relation_mut().through = Some(table),
            Clause::Model(entity) => self.relation_mut().model = Some(entity),
            Clause::Readable => self.readable = true,
            Clause::Required => self.required = true,
            Clause::Unique => self.unique = true,
            Clause::PrimaryKey => self.primary_key = true,
            Clause::AutoIncrement => self.auto_increment = true,
            Clause::Index => self.indexed = true,
            Clause::Unknown(text) => {
                debug!(field = %self.name, clause = %text, "Ignoring unknown annotation clause");
            }
        }
    }

    fn relation_mut(&mut self) -> &mut RelationMetadata {
        self.relation.get_or_insert_with(RelationMetadata::default)
    }

    /// Returns true if the field may be written by a request with `method`.
    #[must_use]
    pub fn is_writable_in(&self, method: &str) -> bool {
        if self.ignore || self.ignore_write {
            return false;
        }
        if self.writable.is_empty() {
            return true;
        }
        let method = method.to_uppercase();
        self.writable.iter().any(|m| *m == method)
    }

    /// Returns true if the field is exposed on reads.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.readable && !self.ignore && !self.ignore_read
    }

    /// Column name: the serialization name, or the `snake_case` field name
    /// when there is none.
    #[must_use]
    pub fn column_name(&self) -> String {
        match self.serialization_name.as_str() {
            "" | "-" => naming::snake_case(&self.name),
            name => name.to_string(),
        }
    }

    /// Returns true if the field has a physical column.
    ///
    /// Ignored fields, `json:"-"` fields, relation fields not named like a
    /// key (`CompanyID`, `OwnerId`) and package-qualified types other than
    /// `time.*` and `uuid.*` have none.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        if self.ignore || (self.ignore_read && self.ignore_write) {
            return false;
        }
        if self.serialization_name == "-" {
            return false;
        }
        if self.relation.is_some() && !self.name.ends_with("ID") && !self.name.ends_with("Id") {
            return false;
        }
        let base = self.go_type.trim_start_matches('*');
        let is_foreign_type =
            base.contains('.') && !base.starts_with("time.") && !base.starts_with("uuid.");
        !is_foreign_type
    }

    /// SQL type from a `type:<sql>` entry of the storage directive.
    #[must_use]
    pub fn sql_type_override(&self) -> Option<&str> {
        self.storage_directive.split(';').find_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let value = value.trim();
            (key.trim().eq_ignore_ascii_case("type") && !value.is_empty()).then_some(value)
        })
    }
}

/// Reads and parses a model file.
///
/// # Errors
///
/// Returns `ParseError` if the file cannot be read, is not valid Go, or
/// declares no struct.
pub fn parse_model_file(path: impl AsRef<Path>) -> Result<EntityMetadata, ParseError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model_source(&source, path)
}

/// Parses model source. `path` is only used for error reporting.
///
/// # Errors
///
/// Returns `ParseError` if the source is not valid Go or declares no struct.
pub fn parse_model_source(
    source: &str,
    path: impl Into<PathBuf>,
) -> Result<EntityMetadata, ParseError> {
    let path = path.into();
    let file = match parser::parse_source(source) {
        Ok(file) => file,
        Err(source) => return Err(ParseError::Syntax { path, source }),
    };

    let Some((decl, body)) = file.first_struct() else {
        return Err(ParseError::NoStruct { path });
    };

    let fields = body
        .fields
        .iter()
        .filter(|field| !field.is_embedded())
        .flat_map(field_metadata)
        .collect();

    Ok(EntityMetadata {
        name: decl.name.clone(),
        package: file.package.clone(),
        table_name: naming::table_name(&decl.name),
        fields,
        imports: file.imports.iter().map(|i| i.path.clone()).collect(),
    })
}

/// Builds one `FieldMetadata` per declared name.
fn field_metadata(decl: &FieldDecl) -> Vec<FieldMetadata> {
    let go_type = decl.ty.to_string();
    let tag = decl.tag.as_deref().unwrap_or_default();
    let serialization_name = tag_value(tag, "json")
        .map(|json| json.split(',').next().unwrap_or_default().to_string())
        .unwrap_or_default();
    let storage_directive = tag_value(tag, "gorm").unwrap_or_default();

    let clauses: Vec<Clause> = decl
        .doc
        .iter()
        .flat_map(|group| group.texts())
        .filter_map(annotations::parse_annotation)
        .flatten()
        .collect();

    decl.names
        .iter()
        .map(|name| {
            let mut field = FieldMetadata::new(name, go_type.clone());
            field.serialization_name.clone_from(&serialization_name);
            field.storage_directive.clone_from(&storage_directive);
            for clause in clauses.iter().cloned() {
                field.apply(clause);
            }
            field
        })
        .collect()
}

/// Extracts `key:"value"` from a struct tag.
fn tag_value(tag: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?:^|\s){}:"([^"]*)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
