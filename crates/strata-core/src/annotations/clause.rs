//! Typed annotation clauses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the API a field is hidden from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreScope {
    /// Neither readable nor writable.
    All,
    /// Never accepted on input.
    Write,
    /// Never returned on output.
    Read,
}

/// A value validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRule {
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    Enum,
    Email,
    Url,
}

impl ValidationRule {
    /// Looks up a rule by its annotation key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "minLength" => Some(Self::MinLength),
            "maxLength" => Some(Self::MaxLength),
            "pattern" => Some(Self::Pattern),
            "enum" => Some(Self::Enum),
            "email" => Some(Self::Email),
            "url" => Some(Self::Url),
            _ => None,
        }
    }

    /// Annotation key of the rule.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::Enum => "enum",
            Self::Email => "email",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship cardinality declared with `relation:<kind>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsTo,
    ManyToMany,
    /// Any other value, kept verbatim.
    Other(String),
}

impl RelationKind {
    /// Returns the kind as written in annotations.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::HasOne => "hasOne",
            Self::HasMany => "hasMany",
            Self::BelongsTo => "belongsTo",
            Self::ManyToMany => "manyToMany",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for RelationKind {
    fn from(value: &str) -> Self {
        match value {
            "hasOne" => Self::HasOne,
            "hasMany" => Self::HasMany,
            "belongsTo" => Self::BelongsTo,
            "manyToMany" => Self::ManyToMany,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RelationKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed annotation clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `writable:post,put`, methods upper-cased.
    Writable(Vec<String>),
    /// `ignore`, `ignore:write`, `ignore:read`.
    Ignore(IgnoreScope),
    /// `min:0`, `email`, ...
    Validation(ValidationRule, String),
    /// `default:<value>`
    Default(String),
    /// `relation:<kind>`
    Relation(RelationKind),
    /// `foreignKey:<column>`
    ForeignKey(String),
    /// `through:<table>`
    Through(String),
    /// `model:<entity>`
    Model(String),
    Readable,
    Required,
    Unique,
    PrimaryKey,
    /// `autoIncrement` or `autoInc`.
    AutoIncrement,
    Index,
    /// Anything not recognized, kept verbatim.
    Unknown(String),
}

impl Clause {
    /// Parses one trimmed clause.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((key, value)) => Self::parse_keyed(key.trim(), value.trim(), text),
            None => Self::parse_flag(text),
        }
    }

    fn parse_keyed(key: &str, value: &str, text: &str) -> Self {
        match key {
            "writable" => Self::Writable(
                value
                    .split(',')
                    .map(|method| method.trim().to_uppercase())
                    .collect(),
            ),
            "ignore" => Self::Ignore(match value {
                "write" => IgnoreScope::Write,
                "read" => IgnoreScope::Read,
                _ => IgnoreScope::All,
            }),
            "min" | "max" | "minLength" | "maxLength" | "pattern" | "enum" => {
                match ValidationRule::from_key(key) {
                    Some(rule) => Self::Validation(rule, value.to_string()),
                    None => Self::Unknown(text.to_string()),
                }
            }
            "default" => Self::Default(value.to_string()),
            "relation" => Self::Relation(RelationKind::from(value)),
            "foreignKey" => Self::ForeignKey(value.to_string()),
            "through" => Self::Through(value.to_string()),
            "model" => Self::Model(value.to_string()),
            _ => Self::Unknown(text.to_string()),
        }
    }

    fn parse_flag(flag: &str) -> Self {
        match flag {
            "readable" => Self::Readable,
            "required" => Self::Required,
            "unique" => Self::Unique,
            "primaryKey" => Self::PrimaryKey,
            "autoIncrement" | "autoInc" => Self::AutoIncrement,
            "index" => Self::Index,
            "ignore" => Self::Ignore(IgnoreScope::All),
            "email" => Self::Validation(ValidationRule::Email, "true".to_string()),
            "url" => Self::Validation(ValidationRule::Url, "true".to_string()),
            other => Self::Unknown(other.to_string()),
        }
    }
}
