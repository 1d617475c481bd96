//! Go declaration parser.
//!
//! A hand-written recursive descent parser that reads package, import and
//! type declarations. Function bodies and value declarations are skipped
//! by delimiter matching.

mod error;
mod parser;

pub use error::SyntaxError;
pub use parser::Parser;

use crate::ast::SourceFile;

/// Parses a complete Go source file.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the source is not a well-formed file.
pub fn parse_source(input: &str) -> Result<SourceFile, SyntaxError> {
    Parser::new(input).parse_file()
}
