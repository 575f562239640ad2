use crate::error::{CompileError, ErrorKind, Result};

/// Suffixes that turn an adjacent number into a CSS dimension string.
const CSS_UNITS: &[&str] = &[
    "px", "em", "rem", "%", "vh", "vw", "vmin", "vmax", "pt", "pc", "cm", "mm", "in", "ex",
    "ch", "s", "ms", "deg", "rad", "grad", "turn", "fr", "dpi", "dpcm", "dppx",
];

/// Bare words that read as CSS values rather than identifiers.
const CSS_EXCEPTIONS: &[&str] = &["infinite", "none", "auto"];

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Str,
    Number,
    Ident,
    /// `$name`; the token text holds `name` without the sigil.
    VarRef,
    // Punctuation
    Colon,
    Comma,
    LParen,
    RParen,
    At,
    /// A verbatim `{ ... }` span, braces included.
    Block,
    // Sentinel
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Unescaped value for strings, raw source text for everything else.
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub col: usize,
    /// Byte offsets into the text that was lexed.
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// The text between the outer braces of a [`TokenKind::Block`].
    pub fn block_body(&self) -> &str {
        debug_assert_eq!(self.kind, TokenKind::Block);
        &self.text[1..self.text.len() - 1]
    }

    /// Absolute position of the first character after the opening `{`.
    pub fn body_origin(&self) -> (usize, usize) {
        (self.line, self.col + 1)
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self::with_origin(src, 1, 1)
    }

    /// Lex `src` as if it started at `line`:`col` of a larger document.
    ///
    /// Used when re-lexing the body of a block so that every position stays
    /// absolute. Only the first line is shifted by `col`.
    pub fn with_origin(src: &'s str, line: usize, col: usize) -> Self {
        Self { src, pos: 0, line, col }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        log::trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.rest().chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn token(&self, kind: TokenKind, text: String, start: usize, line: usize, col: usize) -> Token {
        Token { kind, text, line, col, start, end: self.pos }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            if self.rest().starts_with("//") {
                self.skip_line_comment();
            } else if self.rest().starts_with("/*") {
                self.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while !matches!(self.peek(), None | Some('\n')) {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let (line, col) = (self.line, self.col);
        self.advance();
        self.advance(); // consume `/*`
        loop {
            if self.rest().starts_with("*/") {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.advance().is_none() {
                return Err(CompileError::new(
                    ErrorKind::UnterminatedComment,
                    "Unterminated block comment",
                    line,
                    col,
                ));
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(ch) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, String::new(), start, line, col));
        };

        let punct = match ch {
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '@' => Some(TokenKind::At),
            _ => None,
        };
        if let Some(kind) = punct {
            self.advance();
            return Ok(self.token(kind, ch.to_string(), start, line, col));
        }

        match ch {
            '{' => self.lex_block(),
            '"' | '\'' => self.lex_string(ch),
            '$' => self.lex_variable(),
            '%' => {
                self.advance();
                Ok(self.token(TokenKind::Ident, "%".into(), start, line, col))
            }
            c if c.is_ascii_digit() => self.lex_number(),
            '-' if matches!(self.peek_second(), Some(d) if d.is_ascii_digit()) => self.lex_number(),
            c if is_ident_start(c) => self.lex_ident(),
            other => Err(CompileError::new(
                ErrorKind::UnexpectedCharacter,
                format!("Unexpected character {:?}", other),
                line,
                col,
            )),
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        let unterminated = || {
            CompileError::new(ErrorKind::UnterminatedString, "Unterminated string literal", line, col)
        };
        self.advance(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(unterminated()),
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(c) => s.push(c),
                    None => return Err(unterminated()),
                },
                Some(c) => s.push(c),
            }
        }
        Ok(self.token(TokenKind::Str, s, start, line, col))
    }

    fn lex_number(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // A trailing `.` without digits is not part of the number.
        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = self.src[start..self.pos].to_string();
        Ok(self.token(TokenKind::Number, text, start, line, col))
    }

    fn lex_ident(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.advance();
        }
        let text = self.src[start..self.pos].to_string();
        Ok(self.token(TokenKind::Ident, text, start, line, col))
    }

    fn lex_variable(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance(); // consume `$`
        if !matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            return Err(CompileError::new(
                ErrorKind::MalformedVariable,
                "Invalid variable reference: '$' must be followed by a letter or underscore",
                line,
                col,
            ));
        }
        let name_start = self.pos;
        while matches!(self.peek(), Some(c) if is_variable_char(c)) {
            self.advance();
        }
        let name = self.src[name_start..self.pos].to_string();
        Ok(self.token(TokenKind::VarRef, name, start, line, col))
    }

    fn lex_block(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance(); // consume `{`
        self.scan_balanced(line, col)?;
        let text = self.src[start..self.pos].to_string();
        Ok(self.token(TokenKind::Block, text, start, line, col))
    }

    /// Consume up to and including the `}` matching an already consumed `{`.
    ///
    /// Braces inside quoted strings, template literals and comments do not
    /// count towards the depth.
    fn scan_balanced(&mut self, open_line: usize, open_col: usize) -> Result<()> {
        let mut depth = 1usize;
        loop {
            if self.rest().starts_with("//") && self.at_comment_boundary() {
                self.skip_line_comment();
                continue;
            }
            if self.rest().starts_with("/*") {
                self.skip_block_comment()?;
                continue;
            }
            match self.peek() {
                None => {
                    return Err(CompileError::new(
                        ErrorKind::UnterminatedBlock,
                        "Unterminated block: missing closing '}'",
                        open_line,
                        open_col,
                    ));
                }
                Some('{') => {
                    self.advance();
                    depth += 1;
                }
                Some('}') => {
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(q @ ('"' | '\'')) => self.skip_quoted(q)?,
                Some('`') => self.skip_template()?,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Inside a block `//` starts a line comment except in URL position:
    /// directly after `:` (`http://`) or directly after `url(` (`url(//cdn)`).
    fn at_comment_boundary(&self) -> bool {
        let before = &self.src[..self.pos];
        if before.ends_with(':') {
            return false;
        }
        let tail = before.len().saturating_sub(4);
        !before.get(tail..).is_some_and(|t| t.eq_ignore_ascii_case("url("))
    }

    fn skip_quoted(&mut self, quote: char) -> Result<()> {
        let (line, col) = (self.line, self.col);
        self.advance();
        loop {
            match self.advance() {
                None => {
                    return Err(CompileError::new(
                        ErrorKind::UnterminatedString,
                        "Unterminated string literal",
                        line,
                        col,
                    ));
                }
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Skip a backtick template, descending into `${ ... }` expressions.
    fn skip_template(&mut self) -> Result<()> {
        let (line, col) = (self.line, self.col);
        let unterminated = || {
            CompileError::new(ErrorKind::UnterminatedTemplate, "Unterminated template literal", line, col)
        };
        self.advance(); // consume opening backtick
        loop {
            match self.peek() {
                None => return Err(unterminated()),
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('`') => {
                    self.advance();
                    return Ok(());
                }
                Some('$') if self.peek_second() == Some('{') => {
                    self.advance();
                    self.advance();
                    self.scan_balanced(line, col).map_err(|e| {
                        if e.kind == ErrorKind::UnterminatedBlock { unterminated() } else { e }
                    })?;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '#' | '-')
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '#' | '-')
}

pub(crate) fn is_variable_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_variable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

pub fn is_css_unit(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    CSS_UNITS.contains(&lower.as_str())
}

// ── Value-boundary fusion ─────────────────────────────────────────────────

/// Fold CSS-looking values at `tokens[pos]` into a single string token.
///
/// - `Number` directly followed by a unit identifier (`2s`, `100px`, `50%`)
///   fuses into one `Str` token. The two tokens must touch in the source.
/// - A bare `infinite`, `none` or `auto` becomes a `Str` token.
///
/// Returns the synthetic token and how many input tokens it replaces, or
/// `None` when nothing applies.
pub fn fuse_css_value(tokens: &[Token], pos: usize) -> Option<(Token, usize)> {
    let tok = tokens.get(pos)?;
    match tok.kind {
        TokenKind::Number => {
            let unit = tokens.get(pos + 1)?;
            if unit.kind != TokenKind::Ident || unit.start != tok.end || !is_css_unit(&unit.text) {
                return None;
            }
            let fused = Token {
                kind: TokenKind::Str,
                text: format!("{}{}", tok.text, unit.text),
                end: unit.end,
                ..tok.clone()
            };
            Some((fused, 2))
        }
        TokenKind::Ident => {
            let lower = tok.text.to_ascii_lowercase();
            if !CSS_EXCEPTIONS.contains(&lower.as_str()) {
                return None;
            }
            Some((Token { kind: TokenKind::Str, ..tok.clone() }, 1))
        }
        _ => None,
    }
}
