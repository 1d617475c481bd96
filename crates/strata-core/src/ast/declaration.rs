//! Declarations of a parsed Go source file.

use super::TypeExpr;

/// A single comment with its line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text including the `//` or `/* */` delimiters.
    pub text: String,
    /// Line the comment starts on.
    pub line: usize,
    /// Line the comment ends on.
    pub end_line: usize,
}

/// A run of comments on consecutive lines with nothing else between them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentGroup {
    /// Comments in source order.
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    /// Line of the first comment.
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.comments.first().map_or(0, |c| c.line)
    }

    /// Line of the last comment.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.comments.last().map_or(0, |c| c.end_line)
    }

    /// Iterates over the raw comment texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.comments.iter().map(|c| c.text.as_str())
    }
}

/// An import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit alias (`_`, `.` or a name).
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

/// A struct field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared names. Empty for an embedded field.
    pub names: Vec<String>,
    /// Field type.
    pub ty: TypeExpr,
    /// Raw tag content without the surrounding quotes.
    pub tag: Option<String>,
    /// Doc comment group directly above the field.
    pub doc: Option<CommentGroup>,
    /// Line the declaration starts on.
    pub line: usize,
}

impl FieldDecl {
    /// Returns true for an embedded field (`gorm.Model`).
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A struct type body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructType {
    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
}

/// A type declaration (`type Name T`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Declared name.
    pub name: String,
    /// Declared type.
    pub ty: TypeExpr,
    /// Doc comment group directly above the declaration.
    pub doc: Option<CommentGroup>,
    /// Line the declaration starts on.
    pub line: usize,
}

impl TypeDecl {
    /// Returns the struct body if this declares a struct type.
    #[must_use]
    pub const fn as_struct(&self) -> Option<&StructType> {
        match &self.ty {
            TypeExpr::Struct(body) => Some(body),
            _ => None,
        }
    }
}

/// A parsed Go source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFile {
    /// Package name.
    pub package: String,
    /// Imports in declaration order.
    pub imports: Vec<Import>,
    /// Type declarations in declaration order.
    pub types: Vec<TypeDecl>,
}

impl SourceFile {
    /// Returns the first struct type declared in the file.
    #[must_use]
    pub fn first_struct(&self) -> Option<(&TypeDecl, &StructType)> {
        self.types
            .iter()
            .find_map(|decl| decl.as_struct().map(|body| (decl, body)))
    }
}
