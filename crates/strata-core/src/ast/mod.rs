//! Abstract Syntax Tree (AST) types for Go model files.

mod declaration;
mod types;

pub use declaration::{Comment, CommentGroup, FieldDecl, Import, SourceFile, StructType, TypeDecl};
pub use types::TypeExpr;
