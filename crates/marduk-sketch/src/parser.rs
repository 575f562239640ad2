use crate::ast::{
    AttributeNode, CssStateDirective, ElementNode, JsEventDirective, LiteralValue, Node, Root,
    SpecialBlock, SpecialKind, TextNode, VariableDeclaration, VarsBlock,
};
use crate::catalog::{self, Catalog, Keyword};
use crate::directives::data_id;
use crate::error::{CompileError, ErrorKind, Result};
use crate::lexer::{fuse_css_value, Lexer, Token, TokenKind};
use crate::validate;
use crate::vars::Variables;

const VARS: &str = "vars";
const ON: &str = "on";

/// Deepest element nesting accepted before parsing stops with an error.
pub const MAX_DEPTH: usize = 128;

// ── Phase 1: special blocks ───────────────────────────────────────────────

/// Pull top-level `style { ... }` / `script { ... }` out of the stream.
///
/// Every other token is carried forward unchanged and in order.
pub fn extract_special_blocks(tokens: Vec<Token>) -> (Vec<Token>, Vec<SpecialBlock>) {
    let mut rest = Vec::with_capacity(tokens.len());
    let mut specials = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(tok) = iter.next() {
        let kind = (tok.kind == TokenKind::Ident)
            .then(|| SpecialKind::from_name(&tok.text))
            .flatten();
        if let Some(kind) = kind {
            if let Some(block) = iter.next_if(|t| t.kind == TokenKind::Block) {
                specials.push(SpecialBlock {
                    kind,
                    content: block.block_body().trim().to_string(),
                    line: tok.line,
                    col: tok.col,
                });
                continue;
            }
        }
        rest.push(tok);
    }
    (rest, specials)
}

// ── Cursor ────────────────────────────────────────────────────────────────

/// Position over one token stream. Always ends with an `Eof` token.
struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, col, end) = tokens.last().map(|t| (t.line, t.col, t.end)).unwrap_or((1, 1, 0));
            tokens.push(Token { kind: TokenKind::Eof, text: String::new(), line, col, start: end, end });
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Look at the token `offset` positions ahead of current without consuming.
    fn peek_ahead(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(syntax(tok, format!("Expected {what}, got {}", describe(tok))))
        }
    }
}

fn describe(tok: &Token) -> String {
    match tok.kind {
        TokenKind::Eof => "end of input".into(),
        TokenKind::Block => "a '{ ... }' block".into(),
        TokenKind::Str => format!("string {:?}", tok.text),
        TokenKind::VarRef => format!("'${}'", tok.text),
        _ => format!("'{}'", tok.text),
    }
}

fn syntax(tok: &Token, msg: impl Into<String>) -> CompileError {
    err_at(tok, ErrorKind::Syntax, msg)
}

fn err_at(tok: &Token, kind: ErrorKind, msg: impl Into<String>) -> CompileError {
    CompileError::new(kind, msg, tok.line, tok.col)
}

/// Re-lex the body of a block token with absolute positions.
fn relex(block: &Token) -> Result<Cursor> {
    let (line, col) = block.body_origin();
    let tokens = Lexer::with_origin(block.block_body(), line, col).tokenize()?;
    Ok(Cursor::new(tokens))
}

// ── Values ────────────────────────────────────────────────────────────────

/// Parse one literal: string, number, identifier, `$ref` or `( ... )` tuple.
fn parse_value(cursor: &mut Cursor) -> Result<LiteralValue> {
    if let Some((tok, used)) = fuse_css_value(&cursor.tokens, cursor.pos) {
        cursor.pos += used;
        return Ok(LiteralValue::String(tok.text));
    }

    let tok = cursor.advance();
    match tok.kind {
        TokenKind::Str => Ok(LiteralValue::String(tok.text)),
        TokenKind::Number => LiteralValue::number(&tok.text)
            .ok_or_else(|| syntax(&tok, format!("Invalid number {:?}", tok.text))),
        TokenKind::Ident => Ok(LiteralValue::Identifier(tok.text)),
        TokenKind::VarRef => Ok(LiteralValue::VariableReference { name: tok.text, line: tok.line, col: tok.col }),
        TokenKind::LParen => parse_tuple(cursor),
        _ => Err(syntax(&tok, format!("Expected a value, got {}", describe(&tok)))),
    }
}

/// Members after an already consumed `(`. A trailing comma is allowed.
fn parse_tuple(cursor: &mut Cursor) -> Result<LiteralValue> {
    let mut items = Vec::new();
    loop {
        match cursor.peek().kind {
            TokenKind::RParen => {
                cursor.advance();
                break;
            }
            TokenKind::LParen => return Err(syntax(cursor.peek(), "Tuples cannot be nested")),
            _ => {}
        }
        items.push(parse_value(cursor)?);
        match cursor.peek().kind {
            TokenKind::Comma => {
                cursor.advance();
            }
            TokenKind::RParen => {}
            _ => {
                let tok = cursor.peek();
                return Err(syntax(tok, format!("Expected ',' or ')' in tuple, got {}", describe(tok))));
            }
        }
    }
    Ok(LiteralValue::Tuple(items))
}

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser<'c> {
    catalog: &'c Catalog,
    cursor: Cursor,
    variables: Variables,
}

impl<'c> Parser<'c> {
    /// `tokens` is the top-level stream after special-block extraction.
    pub fn new(catalog: &'c Catalog, tokens: Vec<Token>) -> Self {
        Self { catalog, cursor: Cursor::new(tokens), variables: Variables::new() }
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse_document(&mut self) -> Result<Root> {
        let mut root = Root::default();

        if self.cursor.peek().is_ident(VARS) && self.cursor.peek_ahead(1).kind == TokenKind::Block {
            self.cursor.advance();
            let block = self.cursor.advance();
            let vars = parse_vars(&block)?;
            self.variables = Variables::from_block(&vars)?;
            root.vars = Some(vars);
        }

        loop {
            let tok = self.cursor.peek().clone();
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Ident if tok.text == VARS => {
                    return Err(syntax(&tok, "The vars block must come first and appear only once"));
                }
                TokenKind::Ident if self.cursor.peek_ahead(1).kind == TokenKind::Block => {
                    self.cursor.advance();
                    let block = self.cursor.advance();
                    root.elements.push(self.parse_element(&tok, &block, 1)?);
                }
                _ => {
                    return Err(syntax(
                        &tok,
                        format!(
                            "Expected an element name followed by a '{{ ... }}' block, got {}",
                            describe(&tok)
                        ),
                    ));
                }
            }
        }

        log::debug!(
            "parsed {} top-level elements, {} variables",
            root.elements.len(),
            self.variables.len()
        );
        Ok(root)
    }

    // ── Element ───────────────────────────────────────────────────────────

    /// Parse `name { ... }`, where `block` is the verbatim body token.
    ///
    /// Dispatch inside the block is on the leading token(s):
    /// - `Ident ":"`            → attribute (`on:` starts an event directive)
    /// - `"@"`                  → CSS state directive
    /// - `Str` / `VarRef`       → text content
    /// - `Ident Block`          → child element
    fn parse_element(&self, name_tok: &Token, block: &Token, depth: usize) -> Result<ElementNode> {
        if depth > MAX_DEPTH {
            return Err(syntax(name_tok, format!("Elements are nested more than {MAX_DEPTH} levels deep")));
        }
        let keyword = self.catalog.get(&name_tok.text).ok_or_else(|| {
            err_at(name_tok, ErrorKind::UnknownElement, format!("Unknown element '{}'", name_tok.text))
        })?;

        let mut cursor = relex(block)?;
        let id = data_id(&name_tok.text, name_tok.line, name_tok.col);
        let mut element = ElementNode {
            name: name_tok.text.clone(),
            line: name_tok.line,
            col: name_tok.col,
            attributes: Vec::new(),
            children: Vec::new(),
            css_states: Vec::new(),
            js_events: Vec::new(),
            data_id: None,
        };

        loop {
            let tok = cursor.peek().clone();
            let next = cursor.peek_ahead(1).kind;
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Ident if tok.text == ON && next == TokenKind::Colon => {
                    self.parse_events(&mut cursor, &id, &mut element)?;
                }
                TokenKind::Ident if next == TokenKind::Colon => {
                    self.parse_attribute(&mut cursor, keyword, &mut element)?;
                }
                TokenKind::Ident if next == TokenKind::Block => {
                    cursor.advance();
                    let child_block = cursor.advance();
                    if self.catalog.get(&tok.text).is_some() && !keyword.allows_child(&tok.text) {
                        return Err(err_at(
                            &tok,
                            ErrorKind::ChildNotAllowed,
                            format!("Element '{}' is not allowed inside '{}'", tok.text, keyword.name),
                        ));
                    }
                    let child = self.parse_element(&tok, &child_block, depth + 1)?;
                    element.children.push(Node::Element(child));
                }
                TokenKind::At => self.parse_states(&mut cursor, &id, &mut element)?,
                TokenKind::Str | TokenKind::VarRef => {
                    cursor.advance();
                    if !keyword.allows_text {
                        return Err(err_at(
                            &tok,
                            ErrorKind::TextNotAllowed,
                            format!("Element '{}' does not allow text content", keyword.name),
                        ));
                    }
                    let text = if tok.kind == TokenKind::Str {
                        tok.text
                    } else {
                        let reference =
                            LiteralValue::VariableReference { name: tok.text, line: tok.line, col: tok.col };
                        self.variables.resolve(reference)?.to_string()
                    };
                    element.children.push(Node::Text(TextNode { text }));
                }
                _ => {
                    return Err(syntax(
                        &tok,
                        format!(
                            "Unexpected {} inside '{}': expected an attribute (name: value), a directive, text, or a child element",
                            describe(&tok),
                            keyword.name
                        ),
                    ));
                }
            }
        }

        for spec in keyword.required_attributes() {
            if element.attribute(spec.name).is_none() {
                return Err(err_at(
                    name_tok,
                    ErrorKind::MissingAttribute,
                    format!(
                        "Element '{}' is missing required attribute '{}': {}",
                        keyword.name, spec.name, spec.doc
                    ),
                ));
            }
        }
        for spec in &keyword.attributes {
            if let Some(default) = &spec.default {
                if element.attribute(spec.name).is_none() {
                    element.attributes.push(AttributeNode { name: spec.name.to_string(), value: default.clone() });
                }
            }
        }
        if !element.css_states.is_empty() || !element.js_events.is_empty() {
            element.data_id = Some(id);
        }

        Ok(element)
    }

    // ── Attribute ─────────────────────────────────────────────────────────

    fn parse_attribute(&self, cursor: &mut Cursor, keyword: &Keyword, element: &mut ElementNode) -> Result<()> {
        let name_tok = cursor.advance();
        cursor.advance(); // consume `:`

        let Some(spec) = keyword.attribute(&name_tok.text) else {
            return Err(err_at(
                &name_tok,
                ErrorKind::UnknownAttribute,
                format!("Attribute '{}' is not allowed on element '{}'", name_tok.text, keyword.name),
            ));
        };
        if element.attribute(&name_tok.text).is_some() {
            return Err(err_at(
                &name_tok,
                ErrorKind::DuplicateAttribute,
                format!("Duplicate attribute '{}' on element '{}'", name_tok.text, keyword.name),
            ));
        }

        let (line, col) = (cursor.peek().line, cursor.peek().col);
        let value = self.variables.resolve(parse_value(cursor)?)?;
        validate::check(spec, &value, line, col)?;

        element.attributes.push(AttributeNode { name: name_tok.text, value });
        Ok(())
    }

    // ── Directives ────────────────────────────────────────────────────────

    /// `@state[, @state...] { css }`
    fn parse_states(&self, cursor: &mut Cursor, id: &str, element: &mut ElementNode) -> Result<()> {
        let mut states = Vec::new();
        loop {
            cursor.expect(TokenKind::At, "'@'")?;
            let state = cursor.expect(TokenKind::Ident, "a CSS state name after '@'")?;
            if !catalog::is_css_state(&state.text) {
                return Err(err_at(&state, ErrorKind::UnknownState, format!("Unknown CSS state '@{}'", state.text)));
            }
            states.push(state.text);
            if cursor.peek().kind != TokenKind::Comma {
                break;
            }
            cursor.advance();
        }

        let block = cursor.expect(TokenKind::Block, "a '{ ... }' style body")?;
        let body = self.directive_body(&block)?;
        for state in states {
            element.css_states.push(CssStateDirective { state, data_id: id.to_string(), body: body.clone() });
        }
        Ok(())
    }

    /// `on: event[, on: event...] { js }`
    fn parse_events(&self, cursor: &mut Cursor, id: &str, element: &mut ElementNode) -> Result<()> {
        let mut events = Vec::new();
        loop {
            let on = cursor.expect(TokenKind::Ident, "'on'")?;
            if on.text != ON {
                return Err(syntax(&on, format!("Expected 'on', got {}", describe(&on))));
            }
            cursor.expect(TokenKind::Colon, "':' after 'on'")?;
            let event = cursor.expect(TokenKind::Ident, "a DOM event name")?;
            if !catalog::is_dom_event(&event.text) {
                return Err(err_at(&event, ErrorKind::UnknownEvent, format!("Unknown DOM event '{}'", event.text)));
            }
            events.push(event.text);
            if cursor.peek().kind != TokenKind::Comma {
                break;
            }
            cursor.advance();
        }

        let block = cursor.expect(TokenKind::Block, "a '{ ... }' handler body")?;
        let body = self.directive_body(&block)?;
        for event in events {
            element.js_events.push(JsEventDirective { event, data_id: id.to_string(), body: body.clone() });
        }
        Ok(())
    }

    /// Raw directive text: braces stripped, variables substituted, trimmed.
    fn directive_body(&self, block: &Token) -> Result<String> {
        let (line, col) = block.body_origin();
        let body = self.variables.substitute(block.block_body(), line, col)?;
        Ok(body.trim().to_string())
    }
}

// ── Vars ──────────────────────────────────────────────────────────────────

/// Parse the entries of `vars { name: literal ... }`.
///
/// Literal-ness and uniqueness are enforced by [`Variables::from_block`].
fn parse_vars(block: &Token) -> Result<VarsBlock> {
    let mut cursor = relex(block)?;
    let mut declarations = Vec::new();
    while cursor.peek().kind != TokenKind::Eof {
        let name = cursor.expect(TokenKind::Ident, "a variable name")?;
        cursor.expect(TokenKind::Colon, "':' after the variable name")?;
        let value = parse_value(&mut cursor)?;
        declarations.push(VariableDeclaration { name: name.text, value, line: name.line, col: name.col });
    }
    Ok(VarsBlock { declarations })
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse a `.sketch` source string into a [`Root`].
pub fn parse(source: &str, catalog: &Catalog) -> Result<Root> {
    let tokens = Lexer::new(source).tokenize()?;
    let (tokens, specials) = extract_special_blocks(tokens);
    let mut root = Parser::new(catalog, tokens).parse_document()?;
    root.specials = specials;
    Ok(root)
}
