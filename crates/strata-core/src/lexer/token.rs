//! Token types for the Go lexer.

use super::Span;

/// Go keywords the model parser cares about.
///
/// Statement keywords (`return`, `if`, ...) only ever appear inside
/// function bodies, which are skipped wholesale, so they lex as plain
/// identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Package,
    Import,
    Type,
    Struct,
    Interface,
    Map,
    Chan,
    Func,
    Var,
    Const,
}

impl Keyword {
    /// Attempts to parse a keyword from a string. Go keywords are
    /// case-sensitive.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "package" => Some(Self::Package),
            "import" => Some(Self::Import),
            "type" => Some(Self::Type),
            "struct" => Some(Self::Struct),
            "interface" => Some(Self::Interface),
            "map" => Some(Self::Map),
            "chan" => Some(Self::Chan),
            "func" => Some(Self::Func),
            "var" => Some(Self::Var),
            "const" => Some(Self::Const),
            _ => None,
        }
    }

    /// Returns the keyword as it appears in source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Import => "import",
            Self::Type => "type",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Chan => "chan",
            Self::Func => "func",
            Self::Var => "var",
            Self::Const => "const",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Interpreted string literal, escapes resolved (e.g., "time")
    String(String),
    /// Raw string literal, content verbatim (e.g., `json:"id"`)
    RawString(String),
    /// Rune literal, content verbatim (e.g., 'a')
    Char(String),
    /// Numeric literal, kept as written (e.g., 0x1F, 1e9)
    Number(String),

    // Identifiers and keywords
    /// Identifier (e.g., Product)
    Identifier(String),
    /// Go keyword
    Keyword(Keyword),

    /// Line or block comment, including its `//` or `/* */` delimiters.
    /// `end_line` is the line the comment finishes on.
    Comment { text: String, end_line: usize },

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ; (explicit, or inserted at a newline)
    Semicolon,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// *
    Star,
    /// :
    Colon,
    /// <-
    Arrow,
    /// Any other operator (e.g., =, :=, +, &&)
    Operator(String),

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

impl TokenKind {
    /// Returns true if a newline directly after this token ends the
    /// statement.
    #[must_use]
    pub fn ends_statement(&self) -> bool {
        match self {
            Self::Identifier(_)
            | Self::String(_)
            | Self::RawString(_)
            | Self::Char(_)
            | Self::Number(_)
            | Self::RightParen
            | Self::RightBracket
            | Self::RightBrace => true,
            Self::Operator(op) => op == "++" || op == "--",
            _ => false,
        }
    }
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is a comment.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_sensitive() {
        assert_eq!(Keyword::from_str("struct"), Some(Keyword::Struct));
        assert_eq!(Keyword::from_str("Struct"), None);
        assert_eq!(Keyword::from_str("return"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for kw in [Keyword::Package, Keyword::Map, Keyword::Interface] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_ends_statement() {
        assert!(TokenKind::Identifier("x".into()).ends_statement());
        assert!(TokenKind::RightBrace.ends_statement());
        assert!(!TokenKind::LeftBrace.ends_statement());
        assert!(!TokenKind::Keyword(Keyword::Struct).ends_statement());
    }
}
