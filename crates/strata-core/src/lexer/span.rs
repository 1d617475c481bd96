//! Source positions.

/// Byte range of a token, plus the line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    /// 1-based.
    pub line: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}
