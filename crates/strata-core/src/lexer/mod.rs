//! Go source lexer.
//!
//! A hand-written lexer for the subset of Go needed to read model
//! declarations. Comments are kept as tokens so the parser can attach
//! them to fields, and newlines produce semicolons following Go's
//! automatic semicolon insertion rule.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
