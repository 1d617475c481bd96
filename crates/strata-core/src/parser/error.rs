//! Syntax errors raised while reading Go source.

use thiserror::Error;

use crate::lexer::{Span, TokenKind};

/// A syntax error in a Go source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {}", span.line)]
pub struct SyntaxError {
    pub message: String,
    /// Where the offending token starts and ends.
    pub span: Span,
    /// What the parser was looking for, when it knew.
    pub expected: Option<String>,
    pub found: Option<TokenKind>,
}

impl SyntaxError {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// `found` showed up where `expected` should have been. Running out of
    /// input reads as "unexpected end of file".
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected = expected.into();
        let message = if found == TokenKind::Eof {
            format!("unexpected end of file, expected {expected}")
        } else {
            format!("expected {expected}, found {found:?}")
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }

    /// 1-based line of the error.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.line
    }
}
