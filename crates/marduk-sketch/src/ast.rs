use std::fmt;

// ── LiteralValue ──────────────────────────────────────────────────────────

/// A literal value in an attribute or a `vars` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal; `raw` is the source spelling (`20`, `0.5`, `-3`).
    Number { value: f64, raw: String },
    /// Quoted string, or a fused CSS value such as `100px`.
    String(String),
    /// Unquoted identifier: colors (`#333`), keywords (`bold`, `true`).
    Identifier(String),
    /// Parenthesized list: `(20, 20)`.
    Tuple(Vec<LiteralValue>),
    /// `$name`, eliminated by variable resolution before codegen.
    VariableReference { name: String, line: usize, col: usize },
}

impl LiteralValue {
    pub fn number(raw: &str) -> Option<Self> {
        let value = raw.parse::<f64>().ok()?;
        Some(LiteralValue::Number { value, raw: raw.to_string() })
    }

    pub fn string(s: impl Into<String>) -> Self {
        LiteralValue::String(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// `true` when no variable reference remains anywhere in the value.
    pub fn is_resolved(&self) -> bool {
        match self {
            LiteralValue::VariableReference { .. } => false,
            LiteralValue::Tuple(items) => items.iter().all(LiteralValue::is_resolved),
            _ => true,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            LiteralValue::Number { .. } => "a number",
            LiteralValue::String(_) => "a string",
            LiteralValue::Identifier(_) => "an identifier",
            LiteralValue::Tuple(_) => "a tuple",
            LiteralValue::VariableReference { .. } => "a variable reference",
        }
    }
}

/// Wire text: what the value looks like in generated markup.
impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number { raw, .. } => f.write_str(raw),
            LiteralValue::String(s) | LiteralValue::Identifier(s) => f.write_str(s),
            LiteralValue::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            LiteralValue::VariableReference { name, .. } => write!(f, "${name}"),
        }
    }
}

// ── Attribute ─────────────────────────────────────────────────────────────

/// A single `name: value` attribute, already resolved and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeNode {
    pub name: String,
    pub value: LiteralValue,
}

// ── Directives ────────────────────────────────────────────────────────────

/// `@hover { ... }`: a CSS rule scoped to the owning element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssStateDirective {
    pub state: String,
    pub data_id: String,
    pub body: String,
}

/// `on: click { ... }`: a DOM listener attached to the owning element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsEventDirective {
    pub event: String,
    pub data_id: String,
    pub body: String,
}

// ── Node ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

/// An element instantiation in the tree.
///
/// ```sketch
/// rect {
///     at: (20, 20)
///     @hover { fill: red }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    /// Catalog name: `"svg"`, `"rect"`, `"text"`.
    pub name: String,
    /// Position of the element name in the source.
    pub line: usize,
    pub col: usize,
    pub attributes: Vec<AttributeNode>,
    pub children: Vec<Node>,
    pub css_states: Vec<CssStateDirective>,
    pub js_events: Vec<JsEventDirective>,
    /// Present iff the element owns at least one directive.
    pub data_id: Option<String>,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&LiteralValue> {
        self.attributes.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }
}

// ── Vars ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    pub value: LiteralValue,
    pub line: usize,
    pub col: usize,
}

/// `vars { name: literal ... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarsBlock {
    pub declarations: Vec<VariableDeclaration>,
}

// ── Special blocks ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    Style,
    Script,
}

impl SpecialKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "style" => Some(SpecialKind::Style),
            "script" => Some(SpecialKind::Script),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            SpecialKind::Style => "style",
            SpecialKind::Script => "script",
        }
    }
}

/// Top-level `style { ... }` / `script { ... }` passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialBlock {
    pub kind: SpecialKind,
    /// Block text with the outer braces stripped and surrounding whitespace trimmed.
    pub content: String,
    pub line: usize,
    pub col: usize,
}

// ── Root ──────────────────────────────────────────────────────────────────

/// The top-level parse result for a `.sketch` source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub elements: Vec<ElementNode>,
    pub vars: Option<VarsBlock>,
    pub specials: Vec<SpecialBlock>,
}
