//! Go parser implementation.

use std::collections::BTreeMap;

use super::error::SyntaxError;
use crate::ast::{
    Comment, CommentGroup, FieldDecl, Import, SourceFile, StructType, TypeDecl, TypeExpr,
};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Go declaration parser.
pub struct Parser<'a> {
    input: &'a str,
    /// Tokens without comments, ending with EOF.
    tokens: Vec<Token>,
    pos: usize,
    /// Doc-eligible comment groups keyed by the line they end on.
    doc_groups: BTreeMap<usize, CommentGroup>,
    /// First lexer error, reported before parsing starts.
    lex_error: Option<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let all = Lexer::new(input).tokenize();

        let mut tokens = Vec::with_capacity(all.len());
        let mut doc_groups = BTreeMap::new();
        let mut lex_error = None;

        let mut group: Vec<Comment> = Vec::new();
        let mut group_own_line = false;
        let mut last_code_line = 0;

        for token in all {
            match token.kind {
                TokenKind::Comment { text, end_line } => {
                    let comment = Comment {
                        text,
                        line: token.span.line,
                        end_line,
                    };
                    let continues = group
                        .last()
                        .is_some_and(|prev| comment.line <= prev.end_line + 1);
                    if !continues {
                        flush_group(&mut group, group_own_line, &mut doc_groups);
                        group_own_line = comment.line > last_code_line;
                    }
                    group.push(comment);
                }
                kind => {
                    flush_group(&mut group, group_own_line, &mut doc_groups);
                    if let TokenKind::Error(message) = &kind {
                        if lex_error.is_none() {
                            lex_error = Some(SyntaxError::new(message.clone(), token.span));
                        }
                    }
                    last_code_line = token.span.line;
                    tokens.push(Token::new(kind, token.span));
                }
            }
        }

        Self {
            input,
            tokens,
            pos: 0,
            doc_groups,
            lex_error,
        }
    }

    /// Parses a complete source file.
    ///
    /// # Errors
    ///
    /// Returns a `SyntaxError` if the input is not a valid Go file.
    pub fn parse_file(&mut self) -> Result<SourceFile, SyntaxError> {
        if let Some(err) = self.lex_error.take() {
            return Err(err);
        }

        self.skip_semicolons();
        self.expect_keyword(Keyword::Package)?;
        let package = self.expect_identifier()?;
        self.expect_terminator()?;

        let mut file = SourceFile {
            package,
            ..SourceFile::default()
        };

        loop {
            self.skip_semicolons();
            if !self.check_keyword(Keyword::Import) {
                break;
            }
            self.parse_import_decl(&mut file.imports)?;
        }

        loop {
            self.skip_semicolons();
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Keyword(Keyword::Type) => self.parse_type_decl(&mut file.types)?,
                TokenKind::Keyword(Keyword::Func) => self.skip_func_decl()?,
                TokenKind::Keyword(Keyword::Var | Keyword::Const) => self.skip_value_decl()?,
                TokenKind::Keyword(Keyword::Import) => {
                    return Err(SyntaxError::new(
                        "imports must appear before other declarations",
                        self.current().span,
                    ));
                }
                _ => return Err(self.unexpected("declaration")),
            }
        }

        Ok(file)
    }

    // ------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------

    /// Parses `import "path"` or a grouped `import ( ... )`.
    fn parse_import_decl(&mut self, imports: &mut Vec<Import>) -> Result<(), SyntaxError> {
        self.expect_keyword(Keyword::Import)?;

        if self.check(&TokenKind::LeftParen) {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.check(&TokenKind::RightParen) {
                    break;
                }
                imports.push(self.parse_import_spec()?);
                if !self.check(&TokenKind::RightParen) {
                    self.expect_terminator()?;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        } else {
            imports.push(self.parse_import_spec()?);
        }

        self.expect_terminator()
    }

    fn parse_import_spec(&mut self) -> Result<Import, SyntaxError> {
        let alias = match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            TokenKind::Dot => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };

        let path = match &self.current().kind {
            TokenKind::String(path) | TokenKind::RawString(path) => path.clone(),
            _ => return Err(self.unexpected("import path")),
        };
        self.advance();

        Ok(Import { alias, path })
    }

    /// Parses `type Name T` or a grouped `type ( ... )`.
    fn parse_type_decl(&mut self, types: &mut Vec<TypeDecl>) -> Result<(), SyntaxError> {
        let keyword_line = self.current().span.line;
        self.expect_keyword(Keyword::Type)?;

        if self.check(&TokenKind::LeftParen) {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.check(&TokenKind::RightParen) {
                    break;
                }
                let line = self.current().span.line;
                types.push(self.parse_type_spec(line)?);
                if !self.check(&TokenKind::RightParen) {
                    self.expect_terminator()?;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        } else {
            types.push(self.parse_type_spec(keyword_line)?);
        }

        self.expect_terminator()
    }

    fn parse_type_spec(&mut self, doc_line: usize) -> Result<TypeDecl, SyntaxError> {
        let doc = self.doc_for(doc_line);
        let line = self.current().span.line;
        let name = self.expect_identifier()?;

        // Type parameters: `[T any]`, as opposed to an array length `[4]`.
        if self.check(&TokenKind::LeftBracket)
            && matches!(self.peek_kind(1), TokenKind::Identifier(_))
            && !matches!(self.peek_kind(2), TokenKind::RightBracket)
        {
            self.skip_balanced(&TokenKind::LeftBracket, &TokenKind::RightBracket)?;
        }

        if matches!(&self.current().kind, TokenKind::Operator(op) if op == "=") {
            self.advance();
        }

        let ty = self.parse_type()?;
        Ok(TypeDecl {
            name,
            ty,
            doc,
            line,
        })
    }

    /// Skips a function or method declaration including its body.
    fn skip_func_decl(&mut self) -> Result<(), SyntaxError> {
        self.expect_keyword(Keyword::Func)?;
        let mut parens = 0usize;
        let mut brackets = 0usize;

        loop {
            match &self.current().kind {
                TokenKind::Eof => return Err(self.unexpected("function body")),
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                TokenKind::LeftBracket => brackets += 1,
                TokenKind::RightBracket => brackets = brackets.saturating_sub(1),
                TokenKind::Semicolon if parens == 0 && brackets == 0 => return Ok(()),
                TokenKind::LeftBrace => {
                    let in_signature_type = matches!(
                        self.previous_kind(),
                        Some(TokenKind::Keyword(Keyword::Struct | Keyword::Interface))
                    );
                    self.skip_balanced(&TokenKind::LeftBrace, &TokenKind::RightBrace)?;
                    if in_signature_type || parens > 0 || brackets > 0 {
                        continue;
                    }
                    return Ok(());
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a `var` or `const` declaration.
    fn skip_value_decl(&mut self) -> Result<(), SyntaxError> {
        self.advance();
        if self.check(&TokenKind::LeftParen) {
            return self.skip_balanced(&TokenKind::LeftParen, &TokenKind::RightParen);
        }

        loop {
            match &self.current().kind {
                TokenKind::Eof | TokenKind::Semicolon => return Ok(()),
                TokenKind::LeftParen => {
                    self.skip_balanced(&TokenKind::LeftParen, &TokenKind::RightParen)?;
                }
                TokenKind::LeftBracket => {
                    self.skip_balanced(&TokenKind::LeftBracket, &TokenKind::RightBracket)?;
                }
                TokenKind::LeftBrace => {
                    self.skip_balanced(&TokenKind::LeftBrace, &TokenKind::RightBrace)?;
                }
                _ => self.advance(),
            }
        }
    }

    // ------------------------------------------------------------
    // Types
    // ------------------------------------------------------------

    /// Parses a type expression.
    fn parse_type(&mut self) -> Result<TypeExpr, SyntaxError> {
        match &self.current().kind {
            TokenKind::Star => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LeftBracket => {
                self.advance();
                if self.check(&TokenKind::RightBracket) {
                    self.advance();
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let start = self.current().span;
                let mut end = start;
                while !self.check(&TokenKind::RightBracket) {
                    if self.current().is_eof() {
                        return Err(self.unexpected("]"));
                    }
                    end = self.current().span;
                    self.advance();
                }
                let len = self.input[start.start..end.end].to_string();
                self.expect(&TokenKind::RightBracket)?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.advance();
                self.expect(&TokenKind::LeftBracket)?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RightBracket)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.advance();
                if self.check(&TokenKind::Arrow) {
                    self.advance();
                }
                Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect_keyword(Keyword::Chan)?;
                Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                self.skip_balanced(&TokenKind::LeftParen, &TokenKind::RightParen)?;
                if self.check(&TokenKind::LeftParen) {
                    self.skip_balanced(&TokenKind::LeftParen, &TokenKind::RightParen)?;
                } else if self.starts_type() {
                    self.parse_type()?;
                }
                Ok(TypeExpr::Func)
            }
            TokenKind::Keyword(Keyword::Struct) => Ok(TypeExpr::Struct(self.parse_struct_type()?)),
            TokenKind::Keyword(Keyword::Interface) => {
                self.advance();
                let empty = self.check(&TokenKind::LeftBrace)
                    && matches!(self.peek_kind(1), TokenKind::RightBrace);
                self.skip_balanced(&TokenKind::LeftBrace, &TokenKind::RightBrace)?;
                Ok(TypeExpr::Interface { empty })
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                let ty = if self.check(&TokenKind::Dot) {
                    self.advance();
                    let selector = self.expect_identifier()?;
                    TypeExpr::qualified(name, selector)
                } else {
                    TypeExpr::named(name)
                };
                // Generic instantiation: `List[int]`.
                if self.check(&TokenKind::LeftBracket) {
                    self.skip_balanced(&TokenKind::LeftBracket, &TokenKind::RightBracket)?;
                }
                Ok(ty)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// Parses `struct { ... }`.
    fn parse_struct_type(&mut self) -> Result<StructType, SyntaxError> {
        self.expect_keyword(Keyword::Struct)?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.check(&TokenKind::RightBrace) {
                break;
            }
            fields.push(self.parse_field_decl()?);
            if !self.check(&TokenKind::RightBrace) {
                self.expect_terminator()?;
            }
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(StructType { fields })
    }

    /// Parses one field declaration line.
    fn parse_field_decl(&mut self) -> Result<FieldDecl, SyntaxError> {
        let line = self.current().span.line;
        let doc = self.doc_for(line);

        let (names, ty) = match &self.current().kind {
            TokenKind::Star => (Vec::new(), self.parse_type()?),
            TokenKind::Identifier(first) => {
                let first = first.clone();
                match self.peek_kind(1) {
                    TokenKind::Comma => {
                        let mut names = vec![first];
                        self.advance();
                        while self.check(&TokenKind::Comma) {
                            self.advance();
                            names.push(self.expect_identifier()?);
                        }
                        (names, self.parse_type()?)
                    }
                    TokenKind::Dot
                    | TokenKind::Semicolon
                    | TokenKind::RightBrace
                    | TokenKind::String(_)
                    | TokenKind::RawString(_) => (Vec::new(), self.parse_type()?),
                    _ => {
                        self.advance();
                        (vec![first], self.parse_type()?)
                    }
                }
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let tag = match &self.current().kind {
            TokenKind::String(tag) | TokenKind::RawString(tag) => {
                let tag = tag.clone();
                self.advance();
                Some(tag)
            }
            _ => None,
        };

        Ok(FieldDecl {
            names,
            ty,
            tag,
            doc,
            line,
        })
    }

    // ------------------------------------------------------------
    // Helper methods
    // ------------------------------------------------------------

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)].kind
    }

    fn previous_kind(&self) -> Option<&TokenKind> {
        self.pos.checked_sub(1).map(|i| &self.tokens[i].kind)
    }

    /// Advances to the next token. EOF is sticky.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current().kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current().kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn starts_type(&self) -> bool {
        matches!(
            &self.current().kind,
            TokenKind::Star
                | TokenKind::LeftBracket
                | TokenKind::Identifier(_)
                | TokenKind::Arrow
                | TokenKind::Keyword(
                    Keyword::Map
                        | Keyword::Chan
                        | Keyword::Func
                        | Keyword::Struct
                        | Keyword::Interface
                )
        )
    }

    fn skip_semicolons(&mut self) {
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Skips from an opening delimiter to just past its matching close.
    fn skip_balanced(&mut self, open: &TokenKind, close: &TokenKind) -> Result<(), SyntaxError> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.current().is_eof() {
                return Err(SyntaxError::unexpected(
                    format!("{close:?}"),
                    TokenKind::Eof,
                    self.current().span,
                ));
            }
            if self.check(open) {
                depth += 1;
            } else if self.check(close) {
                depth -= 1;
            }
            self.advance();
        }
        Ok(())
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), SyntaxError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(format!("{kind:?}")))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Expects and returns an identifier.
    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Expects the end of a declaration: a semicolon or end of input.
    fn expect_terminator(&mut self) -> Result<(), SyntaxError> {
        match &self.current().kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("newline or ;")),
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> SyntaxError {
        let token = self.current();
        SyntaxError::unexpected(expected, token.kind.clone(), token.span)
    }

    /// Doc group ending on the line directly above `line`.
    fn doc_for(&self, line: usize) -> Option<CommentGroup> {
        line.checked_sub(1)
            .and_then(|above| self.doc_groups.get(&above))
            .cloned()
    }
}

/// Closes the pending comment group. Only groups that start on their own
/// line can document the next declaration.
fn flush_group(
    group: &mut Vec<Comment>,
    own_line: bool,
    doc_groups: &mut BTreeMap<usize, CommentGroup>,
) {
    if group.is_empty() {
        return;
    }
    let comments = std::mem::take(group);
    if own_line {
        let group = CommentGroup { comments };
        doc_groups.insert(group.end_line(), group);
    }
}
