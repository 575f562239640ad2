//! Static knowledge base: every element the compiler knows, the attributes
//! each element accepts, and how those attributes are written to markup.
//!
//! The catalog is immutable once built. [`Catalog::global`] hands out a
//! process-wide instance initialised exactly once; tests and tooling can
//! build their own with [`Catalog::new`] and [`Catalog::insert`].

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ast::LiteralValue;

// ── Checks ────────────────────────────────────────────────────────────────

pub type NumberCheck = fn(f64) -> Result<(), String>;
pub type StringCheck = fn(&str) -> Result<(), String>;
pub type TupleCheck = fn(&[LiteralValue]) -> Result<(), String>;

// ── Attribute kinds ───────────────────────────────────────────────────────

/// Expected kind of one tuple slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A number, or a string such as `100px` standing in for one.
    Number,
    String,
    Identifier,
}

#[derive(Debug, Clone)]
pub enum AttributeKind {
    Number { check: Option<NumberCheck> },
    /// Quoted strings and bare identifiers (`#333`, `red`).
    String { check: Option<StringCheck> },
    /// The identifiers `true` / `false`, case-insensitive.
    Boolean,
    /// Fixed arity: one entry in `slots` per position.
    Tuple { slots: Vec<SlotKind>, check: Option<TupleCheck> },
}

// ── Produce ───────────────────────────────────────────────────────────────

/// How an attribute turns into wire `(name, value)` pairs.
#[derive(Debug, Clone)]
pub enum Produce {
    /// `strokeWidth: 2` → `stroke-width="2"`
    Rename(&'static str),
    /// `at: (1, 2)` → `x="1" y="2"`
    SplitPair(&'static str, &'static str),
    /// `font: (12, "Inter", bold)` → three attributes.
    SplitTriple(&'static str, &'static str, &'static str),
    /// `{0}`, `{1}`, … in `template` are replaced by tuple members.
    JoinWithTemplate { name: &'static str, template: &'static str },
    Custom(fn(&LiteralValue) -> Vec<(String, String)>),
}

impl Produce {
    pub fn apply(&self, name: &str, value: &LiteralValue) -> Vec<(String, String)> {
        match self {
            Produce::Rename(wire) => vec![(wire.to_string(), value.to_string())],
            Produce::SplitPair(a, b) => split(&[a, b], name, value),
            Produce::SplitTriple(a, b, c) => split(&[a, b, c], name, value),
            Produce::JoinWithTemplate { name: wire, template } => {
                let members = match value {
                    LiteralValue::Tuple(items) => items.iter().map(ToString::to_string).collect(),
                    other => vec![other.to_string()],
                };
                let mut out = template.to_string();
                for (i, member) in members.iter().enumerate() {
                    out = out.replace(&format!("{{{i}}}"), member);
                }
                vec![(wire.to_string(), out)]
            }
            Produce::Custom(f) => f(value),
        }
    }
}

fn split(names: &[&&'static str], name: &str, value: &LiteralValue) -> Vec<(String, String)> {
    match value {
        LiteralValue::Tuple(items) if items.len() == names.len() => names
            .iter()
            .zip(items)
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        other => vec![(name.to_string(), other.to_string())],
    }
}

// ── Attribute spec ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub doc: &'static str,
    pub required: bool,
    /// Emitted when the attribute is absent from the source.
    pub default: Option<LiteralValue>,
    pub kind: AttributeKind,
    pub produce: Option<Produce>,
}

impl AttributeSpec {
    fn with_kind(name: &'static str, doc: &'static str, kind: AttributeKind) -> Self {
        Self { name, doc, required: false, default: None, kind, produce: None }
    }

    pub fn number(name: &'static str, doc: &'static str) -> Self {
        Self::with_kind(name, doc, AttributeKind::Number { check: None })
    }

    pub fn string(name: &'static str, doc: &'static str) -> Self {
        Self::with_kind(name, doc, AttributeKind::String { check: None })
    }

    pub fn boolean(name: &'static str, doc: &'static str) -> Self {
        Self::with_kind(name, doc, AttributeKind::Boolean)
    }

    pub fn tuple(name: &'static str, doc: &'static str, slots: &[SlotKind]) -> Self {
        Self::with_kind(name, doc, AttributeKind::Tuple { slots: slots.to_vec(), check: None })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: LiteralValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn produce(mut self, produce: Produce) -> Self {
        self.produce = Some(produce);
        self
    }

    /// Attach a numeric check. Ignored for non-number specs.
    pub fn check_number(mut self, f: NumberCheck) -> Self {
        if let AttributeKind::Number { check } = &mut self.kind {
            *check = Some(f);
        }
        self
    }

    /// Attach a string check. Ignored for non-string specs.
    pub fn check_string(mut self, f: StringCheck) -> Self {
        if let AttributeKind::String { check } = &mut self.kind {
            *check = Some(f);
        }
        self
    }

    /// Attach a whole-tuple check. Ignored for non-tuple specs.
    pub fn check_tuple(mut self, f: TupleCheck) -> Self {
        if let AttributeKind::Tuple { check, .. } = &mut self.kind {
            *check = Some(f);
        }
        self
    }

    /// Wire pairs for `value`, falling back to the plain name when the attribute
    /// has no transform.
    pub fn wire_pairs(&self, value: &LiteralValue) -> Vec<(String, String)> {
        match &self.produce {
            Some(p) => p.apply(self.name, value),
            None => vec![(self.name.to_string(), value.to_string())],
        }
    }
}

// ── Keyword ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPolicy {
    Any,
    /// Only the listed element names; empty means no child elements.
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct Keyword {
    pub name: &'static str,
    pub attributes: Vec<AttributeSpec>,
    pub children: ChildPolicy,
    pub allows_text: bool,
}

impl Keyword {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn allows_child(&self, name: &str) -> bool {
        match self.children {
            ChildPolicy::Any => true,
            ChildPolicy::Only(names) => names.contains(&name),
        }
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| a.required)
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    keywords: HashMap<&'static str, Keyword>,
}

static GLOBAL: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in catalog, constructed on first use.
    pub fn global() -> &'static Catalog {
        &GLOBAL
    }

    pub fn insert(&mut self, keyword: Keyword) {
        debug_assert!(
            keyword
                .attributes
                .iter()
                .enumerate()
                .all(|(i, a)| keyword.attributes[..i].iter().all(|b| b.name != a.name)),
            "duplicate attribute spec on `{}`",
            keyword.name
        );
        self.keywords.insert(keyword.name, keyword);
    }

    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.keywords.get(name)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Element names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.keywords.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for keyword in builtin_keywords() {
            catalog.insert(keyword);
        }
        log::debug!("built element catalog with {} keywords", catalog.len());
        catalog
    }
}

// ── Directive names ───────────────────────────────────────────────────────

pub static CSS_STATES: &[&str] = &[
    "hover", "active", "focus", "focus-within", "focus-visible", "visited", "link", "target",
    "checked", "disabled", "enabled", "first-child", "last-child", "only-child", "empty",
];

pub static DOM_EVENTS: &[&str] = &[
    "click", "dblclick", "contextmenu", "mousedown", "mouseup", "mousemove", "mouseenter",
    "mouseleave", "mouseover", "mouseout", "wheel", "pointerdown", "pointerup", "pointermove",
    "pointerenter", "pointerleave", "pointercancel", "touchstart", "touchend", "touchmove",
    "keydown", "keyup", "keypress", "focus", "blur", "focusin", "focusout", "input", "change",
    "submit", "scroll", "load", "error", "animationstart", "animationend", "animationiteration",
    "transitionend",
];

pub fn is_css_state(name: &str) -> bool {
    CSS_STATES.contains(&name)
}

pub fn is_dom_event(name: &str) -> bool {
    DOM_EVENTS.contains(&name)
}

// ── Checks used by the built-in specs ─────────────────────────────────────

fn non_negative(v: f64) -> Result<(), String> {
    if v < 0.0 { Err("must not be negative".into()) } else { Ok(()) }
}

fn unit_interval(v: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&v) { Ok(()) } else { Err("must be between 0 and 1".into()) }
}

fn non_negative_members(items: &[LiteralValue]) -> Result<(), String> {
    if items.iter().filter_map(LiteralValue::as_f64).any(|v| v < 0.0) {
        Err("values must not be negative".into())
    } else {
        Ok(())
    }
}

fn px_length(s: &str) -> Result<(), String> {
    match s.strip_suffix("px").map(str::parse::<f64>) {
        Some(Ok(_)) => Ok(()),
        _ => Err(format!("'{s}' must be a pixel length such as '2px'")),
    }
}

fn one_of(s: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&s) {
        Ok(())
    } else {
        Err(format!("'{s}' must be one of: {}", allowed.join(", ")))
    }
}

fn line_cap(s: &str) -> Result<(), String> {
    one_of(s, &["butt", "round", "square"])
}

fn text_anchor(s: &str) -> Result<(), String> {
    one_of(s, &["start", "middle", "end"])
}

/// `filled: false` clears the fill; `filled: true` keeps the default.
fn filled_wire(value: &LiteralValue) -> Vec<(String, String)> {
    match value {
        LiteralValue::Identifier(b) if b.eq_ignore_ascii_case("false") => {
            vec![("fill".into(), "none".into())]
        }
        _ => Vec::new(),
    }
}

// ── Shared attribute sets (referenced by multiple elements) ───────────────

fn presentation() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::string("fill", "Fill paint (`#rrggbb`, a color name, or `none`)."),
        AttributeSpec::string("stroke", "Stroke paint."),
        AttributeSpec::number("strokeWidth", "Stroke width in user units.")
            .check_number(non_negative)
            .produce(Produce::Rename("stroke-width")),
        AttributeSpec::number("opacity", "Opacity in [0, 1].").check_number(unit_interval),
        AttributeSpec::string("id", "Element id."),
        AttributeSpec::string("class", "Space-separated class list."),
    ]
}

fn position(x: &'static str, y: &'static str) -> AttributeSpec {
    AttributeSpec::tuple("at", "Position as `(x, y)`.", &[SlotKind::Number, SlotKind::Number])
        .produce(Produce::SplitPair(x, y))
}

fn size() -> AttributeSpec {
    AttributeSpec::tuple("size", "Size as `(width, height)`.", &[SlotKind::Number, SlotKind::Number])
        .check_tuple(non_negative_members)
        .produce(Produce::SplitPair("width", "height"))
}

fn radius() -> AttributeSpec {
    AttributeSpec::tuple("radius", "Corner radii as `(rx, ry)`.", &[SlotKind::Number, SlotKind::Number])
        .check_tuple(non_negative_members)
        .produce(Produce::SplitPair("rx", "ry"))
}

fn dash() -> AttributeSpec {
    AttributeSpec::tuple("dash", "Dash pattern as `(dash, gap)`.", &[SlotKind::Number, SlotKind::Number])
        .check_tuple(non_negative_members)
        .produce(Produce::JoinWithTemplate { name: "stroke-dasharray", template: "{0} {1}" })
}

fn with_presentation(mut own: Vec<AttributeSpec>) -> Vec<AttributeSpec> {
    own.extend(presentation());
    own
}

const SHAPE_CHILDREN: ChildPolicy = ChildPolicy::Only(&["title"]);

// ── Element registry ──────────────────────────────────────────────────────

fn builtin_keywords() -> Vec<Keyword> {
    vec![
        // ── svg ───────────────────────────────────────────────────────────
        Keyword {
            name: "svg",
            attributes: vec![
                size(),
                AttributeSpec::tuple(
                    "viewBox",
                    "User coordinate system as `(minX, minY, width, height)`.",
                    &[SlotKind::Number; 4],
                )
                .produce(Produce::JoinWithTemplate { name: "viewBox", template: "{0} {1} {2} {3}" }),
                AttributeSpec::string("xmlns", "XML namespace.")
                    .default_value(LiteralValue::string("http://www.w3.org/2000/svg")),
                AttributeSpec::string("id", "Element id."),
                AttributeSpec::string("class", "Space-separated class list."),
            ],
            children: ChildPolicy::Any,
            allows_text: false,
        },
        // ── g ─────────────────────────────────────────────────────────────
        Keyword {
            name: "g",
            attributes: with_presentation(vec![
                AttributeSpec::tuple("at", "Translation as `(x, y)`.", &[SlotKind::Number, SlotKind::Number])
                    .produce(Produce::JoinWithTemplate { name: "transform", template: "translate({0}, {1})" }),
            ]),
            children: ChildPolicy::Any,
            allows_text: false,
        },
        // ── rect ──────────────────────────────────────────────────────────
        Keyword {
            name: "rect",
            attributes: with_presentation(vec![position("x", "y"), size(), radius()]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── circle ────────────────────────────────────────────────────────
        Keyword {
            name: "circle",
            attributes: with_presentation(vec![
                position("cx", "cy"),
                AttributeSpec::number("r", "Radius.").required().check_number(non_negative),
                AttributeSpec::boolean("filled", "`false` draws the outline only.")
                    .produce(Produce::Custom(filled_wire)),
            ]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── ellipse ───────────────────────────────────────────────────────
        Keyword {
            name: "ellipse",
            attributes: with_presentation(vec![position("cx", "cy"), radius().required()]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── line ──────────────────────────────────────────────────────────
        Keyword {
            name: "line",
            attributes: with_presentation(vec![
                AttributeSpec::tuple("from", "Start point as `(x, y)`.", &[SlotKind::Number, SlotKind::Number])
                    .required()
                    .produce(Produce::SplitPair("x1", "y1")),
                AttributeSpec::tuple("to", "End point as `(x, y)`.", &[SlotKind::Number, SlotKind::Number])
                    .required()
                    .produce(Produce::SplitPair("x2", "y2")),
                AttributeSpec::string("cap", "Line cap: `butt`, `round` or `square`.")
                    .check_string(line_cap)
                    .produce(Produce::Rename("stroke-linecap")),
                dash(),
            ]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── path ──────────────────────────────────────────────────────────
        Keyword {
            name: "path",
            attributes: with_presentation(vec![
                AttributeSpec::string("d", "Path data.").required(),
                dash(),
            ]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── polygon ───────────────────────────────────────────────────────
        Keyword {
            name: "polygon",
            attributes: with_presentation(vec![
                AttributeSpec::string("points", "Point list: `\"0,0 10,0 5,8\"`.").required(),
            ]),
            children: SHAPE_CHILDREN,
            allows_text: false,
        },
        // ── text ──────────────────────────────────────────────────────────
        Keyword {
            name: "text",
            attributes: with_presentation(vec![
                position("x", "y"),
                AttributeSpec::tuple(
                    "font",
                    "Font shorthand as `(size, \"family\", weight)`.",
                    &[SlotKind::Number, SlotKind::String, SlotKind::Identifier],
                )
                .produce(Produce::SplitTriple("font-size", "font-family", "font-weight")),
                AttributeSpec::number("fontSize", "Font size in user units.")
                    .check_number(non_negative)
                    .produce(Produce::Rename("font-size")),
                AttributeSpec::string("fontFamily", "Font family list.")
                    .produce(Produce::Rename("font-family")),
                AttributeSpec::string("anchor", "Horizontal anchor: `start`, `middle` or `end`.")
                    .check_string(text_anchor)
                    .produce(Produce::Rename("text-anchor")),
                AttributeSpec::string("letterSpacing", "Letter spacing as a pixel length (`2px`).")
                    .check_string(px_length)
                    .produce(Produce::Rename("letter-spacing")),
            ]),
            children: ChildPolicy::Only(&["tspan"]),
            allows_text: true,
        },
        // ── tspan ─────────────────────────────────────────────────────────
        Keyword {
            name: "tspan",
            attributes: with_presentation(vec![
                position("x", "y"),
                AttributeSpec::number("dy", "Vertical shift relative to the previous glyph."),
            ]),
            children: ChildPolicy::Only(&[]),
            allows_text: true,
        },
        // ── image ─────────────────────────────────────────────────────────
        Keyword {
            name: "image",
            attributes: vec![
                position("x", "y"),
                size(),
                AttributeSpec::string("href", "Image URL.").required(),
                AttributeSpec::number("opacity", "Opacity in [0, 1].").check_number(unit_interval),
                AttributeSpec::string("id", "Element id."),
                AttributeSpec::string("class", "Space-separated class list."),
            ],
            children: ChildPolicy::Only(&[]),
            allows_text: false,
        },
        // ── title ─────────────────────────────────────────────────────────
        Keyword {
            name: "title",
            attributes: Vec::new(),
            children: ChildPolicy::Only(&[]),
            allows_text: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(raw: &str) -> LiteralValue {
        LiteralValue::number(raw).unwrap()
    }

    fn pair(a: &str, b: &str) -> LiteralValue {
        LiteralValue::Tuple(vec![num(a), num(b)])
    }

    fn s(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(Catalog::global(), Catalog::global()));
        assert!(Catalog::global().get("rect").is_some());
        assert!(Catalog::global().get("div").is_none());
    }

    #[test]
    fn builtin_names_are_sorted() {
        let names = Catalog::builtin().names();
        assert_eq!(names.first(), Some(&"circle"));
        assert!(names.contains(&"svg"));
    }

    #[test]
    fn split_pair() {
        let spec = position("cx", "cy");
        assert_eq!(spec.wire_pairs(&pair("1", "2")), vec![s("cx", "1"), s("cy", "2")]);
    }

    #[test]
    fn split_triple() {
        let v = LiteralValue::Tuple(vec![
            num("12"),
            LiteralValue::string("Inter"),
            LiteralValue::Identifier("bold".into()),
        ]);
        let pairs = Produce::SplitTriple("a", "b", "c").apply("font", &v);
        assert_eq!(pairs, vec![s("a", "12"), s("b", "Inter"), s("c", "bold")]);
    }

    #[test]
    fn join_with_template() {
        let p = Produce::JoinWithTemplate { name: "transform", template: "translate({0}, {1})" };
        assert_eq!(p.apply("at", &pair("5", "-4")), vec![s("transform", "translate(5, -4)")]);
    }

    #[test]
    fn rename_and_fallback() {
        let rect = Catalog::global().get("rect").unwrap();
        let sw = rect.attribute("strokeWidth").unwrap();
        assert_eq!(sw.wire_pairs(&num("2")), vec![s("stroke-width", "2")]);
        let id = rect.attribute("id").unwrap();
        assert_eq!(id.wire_pairs(&LiteralValue::string("box")), vec![s("id", "box")]);
    }

    #[test]
    fn custom_filled() {
        let off = LiteralValue::Identifier("FALSE".into());
        assert_eq!(filled_wire(&off), vec![s("fill", "none")]);
        assert!(filled_wire(&LiteralValue::Identifier("true".into())).is_empty());
    }

    #[test]
    fn child_policies() {
        let c = Catalog::global();
        assert!(c.get("svg").unwrap().allows_child("anything"));
        assert!(c.get("rect").unwrap().allows_child("title"));
        assert!(!c.get("rect").unwrap().allows_child("circle"));
        assert!(!c.get("title").unwrap().allows_child("title"));
    }

    #[test]
    fn required_attributes() {
        let line = Catalog::global().get("line").unwrap();
        let names: Vec<_> = line.required_attributes().map(|a| a.name).collect();
        assert_eq!(names, vec!["from", "to"]);
    }

    #[test]
    fn checks() {
        assert!(px_length("2px").is_ok());
        assert!(px_length("-0.5px").is_ok());
        assert!(px_length("2em").is_err());
        assert!(unit_interval(1.5).is_err());
        assert!(line_cap("round").is_ok());
        assert!(non_negative_members(&[num("1"), num("-1")]).is_err());
    }

    #[test]
    fn directive_names() {
        assert!(is_css_state("focus-within"));
        assert!(!is_css_state("click"));
        assert!(is_dom_event("click"));
        assert!(!is_dom_event("hover"));
    }
}
