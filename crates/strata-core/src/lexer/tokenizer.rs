//! Go tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

const BOM: char = '\u{feff}';

/// A lexer that tokenizes Go source.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// The current 1-based line.
    line: usize,
    /// The line the current token starts on.
    start_line: usize,
    /// Whether the next newline should produce a semicolon.
    insert_semicolon: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input. A leading byte order mark
    /// is skipped.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let pos = if input.starts_with(BOM) { BOM.len_utf8() } else { 0 };
        Self {
            input,
            pos,
            start: pos,
            line: 1,
            start_line: 1,
            insert_semicolon: false,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Marks the start of a new token at the current position.
    fn begin(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Skips blanks. Returns an inserted semicolon token if a newline
    /// terminates the current statement.
    fn skip_whitespace(&mut self) -> Option<Token> {
        while let Some(c) = self.peek() {
            if c == '\n' && self.insert_semicolon {
                self.begin();
                self.advance();
                self.insert_semicolon = false;
                return Some(self.make_token(TokenKind::Semicolon));
            }
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
        None
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(text.to_string())),
        }
    }

    /// Scans a numeric literal. Go has many literal forms (hex, octal,
    /// binary, imaginary, digit separators); they are kept verbatim.
    fn scan_number(&mut self) -> Token {
        let literal = &self.input[self.start..];
        let hex = literal.starts_with("0x") || literal.starts_with("0X");
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign =
                (c == '+' || c == '-') && !hex && matches!(prev, 'e' | 'E' | 'p' | 'P');
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign) {
                break;
            }
            prev = c;
            self.advance();
        }
        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Number(text.to_string()))
    }

    /// Scans an interpreted string literal, resolving simple escapes.
    fn scan_string(&mut self) -> Token {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        return self.make_token(TokenKind::Error(
                            "Unterminated string literal".to_string(),
                        ));
                    }
                },
                Some('\n') => {
                    return self.make_token(TokenKind::Error("Newline in string literal".to_string()));
                }
                Some(c) => value.push(c),
                None => {
                    return self
                        .make_token(TokenKind::Error("Unterminated string literal".to_string()));
                }
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Scans a raw string literal. Raw strings may span lines.
    fn scan_raw_string(&mut self) -> Token {
        let content_start = self.pos;
        loop {
            match self.advance() {
                Some('`') => break,
                Some(_) => {}
                None => {
                    return self.make_token(TokenKind::Error(
                        "Unterminated raw string literal".to_string(),
                    ));
                }
            }
        }
        let content = &self.input[content_start..self.pos - 1];
        self.make_token(TokenKind::RawString(content.to_string()))
    }

    /// Scans a rune literal.
    fn scan_char(&mut self) -> Token {
        let content_start = self.pos;
        loop {
            match self.advance() {
                Some('\'') => break,
                Some('\\') => {
                    self.advance();
                }
                Some('\n') | None => {
                    return self.make_token(TokenKind::Error("Unterminated rune literal".to_string()));
                }
                Some(_) => {}
            }
        }
        let content = &self.input[content_start..self.pos - 1];
        self.make_token(TokenKind::Char(content.to_string()))
    }

    /// Scans a `//` comment up to (not including) the newline.
    fn scan_line_comment(&mut self) -> Token {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
        let text = self.input[self.start..self.pos].trim_end_matches('\r');
        self.make_token(TokenKind::Comment {
            text: text.to_string(),
            end_line: self.start_line,
        })
    }

    /// Scans a `/* */` comment.
    fn scan_block_comment(&mut self) -> Token {
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
                Some(_) => {}
                None => {
                    return self.make_token(TokenKind::Error("Unterminated block comment".to_string()));
                }
            }
        }
        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Comment {
            text: text.to_string(),
            end_line: self.line,
        })
    }

    /// Scans punctuation and operators.
    fn scan_operator(&mut self, c: char) -> Token {
        let rest = &self.input[self.start..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.pos = self.start + op.len();
            return match *op {
                "..." => self.make_token(TokenKind::Ellipsis),
                "<-" => self.make_token(TokenKind::Arrow),
                other => self.make_token(TokenKind::Operator(other.to_string())),
            };
        }

        match c {
            '*' => self.make_token(TokenKind::Star),
            ':' => self.make_token(TokenKind::Colon),
            '.' => self.make_token(TokenKind::Dot),
            '+' | '-' | '/' | '%' | '&' | '|' | '^' | '<' | '>' | '=' | '!' | '~' => {
                self.make_token(TokenKind::Operator(c.to_string()))
            }
            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        if let Some(semicolon) = self.skip_whitespace() {
            return semicolon;
        }
        self.begin();

        let Some(c) = self.advance() else {
            if self.insert_semicolon {
                self.insert_semicolon = false;
                return self.make_token(TokenKind::Semicolon);
            }
            return self.make_token(TokenKind::Eof);
        };

        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),

            '/' if self.peek() == Some('/') => self.scan_line_comment(),
            '/' if self.peek() == Some('*') => self.scan_block_comment(),

            '"' => self.scan_string(),
            '`' => self.scan_raw_string(),
            '\'' => self.scan_char(),

            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if c.is_ascii_digit() => self.scan_number(),

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            c => self.scan_operator(c),
        };

        if !token.is_comment() {
            self.insert_semicolon = token.kind.ends_statement();
        }
        token
    }

    /// Tokenizes the entire input and returns all tokens, ending with EOF.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
