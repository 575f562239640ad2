use crate::ast::{CssStateDirective, ElementNode, JsEventDirective, Node, Root, SpecialBlock};
use crate::catalog::Catalog;
use crate::directives::{DirectiveCollector, DirectiveGroup};

/// Attribute carrying the generated per-element id.
pub const DATA_ATTRIBUTE: &str = "data-identifier";

const INDENT: &str = "  ";

// ── Document ──────────────────────────────────────────────────────────────

/// Render the markup tree, then the generated `<style>` and `<script>`
/// sections, then every special block in source order.
pub fn generate(root: &Root, catalog: &Catalog) -> String {
    let mut out = String::new();

    for element in &root.elements {
        write_element(&mut out, element, catalog, 0);
    }

    let directives = DirectiveCollector::collect(root);

    let styles = render_styles(&directives.styles);
    if !styles.is_empty() {
        wrap(&mut out, "style", &styles);
    }
    let scripts = render_scripts(&directives.scripts);
    if !scripts.is_empty() {
        wrap(&mut out, "script", &scripts);
    }

    for special in &root.specials {
        write_special(&mut out, special);
    }

    log::debug!(
        "generated {} bytes ({} style groups, {} script groups, {} special blocks)",
        out.len(),
        directives.styles.len(),
        directives.scripts.len(),
        root.specials.len()
    );
    out
}

fn wrap(out: &mut String, tag: &str, body: &str) {
    out.push('<');
    out.push_str(tag);
    out.push_str(">\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn write_special(out: &mut String, special: &SpecialBlock) {
    wrap(out, special.kind.tag(), &special.content);
}

// ── Markup ────────────────────────────────────────────────────────────────

/// Wire `(name, value)` pairs for an element: `data-identifier` first, then
/// each attribute through its spec's `produce` transform.
pub fn wire_attributes(element: &ElementNode, catalog: &Catalog) -> Vec<(String, String)> {
    let keyword = catalog.get(&element.name);
    let mut pairs = Vec::with_capacity(element.attributes.len() + 1);
    if let Some(id) = &element.data_id {
        pairs.push((DATA_ATTRIBUTE.to_string(), id.clone()));
    }
    for attr in &element.attributes {
        match keyword.and_then(|k| k.attribute(&attr.name)) {
            Some(spec) => pairs.extend(spec.wire_pairs(&attr.value)),
            None => pairs.push((attr.name.clone(), attr.value.to_string())),
        }
    }
    pairs
}

fn write_element(out: &mut String, element: &ElementNode, catalog: &Catalog, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in wire_attributes(element, catalog) {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_attr(&value));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    // Text-only content stays on one line: `<text>Hello</text>`.
    if element.children.iter().all(|c| matches!(c, Node::Text(_))) {
        out.push('>');
        for child in &element.children {
            if let Node::Text(t) = child {
                out.push_str(&escape_text(&t.text));
            }
        }
    } else {
        out.push_str(">\n");
        for child in &element.children {
            match child {
                Node::Element(e) => write_element(out, e, catalog, depth + 1),
                Node::Text(t) => {
                    out.push_str(&indent);
                    out.push_str(INDENT);
                    out.push_str(&escape_text(&t.text));
                    out.push('\n');
                }
            }
        }
        out.push_str(&indent);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

// ── Style ─────────────────────────────────────────────────────────────────

fn selector(data_id: &str) -> String {
    format!("[{DATA_ATTRIBUTE}=\"{data_id}\"]")
}

/// One rule per directive: `[data-identifier="id"]:state { body }`.
pub fn render_styles(groups: &[DirectiveGroup<'_, CssStateDirective>]) -> String {
    let mut out = String::new();
    for group in groups {
        let sel = selector(group.data_id);
        for d in &group.directives {
            if d.body.is_empty() {
                out.push_str(&format!("{sel}:{} {{}}\n", d.state));
            } else {
                out.push_str(&format!("{sel}:{} {{ {} }}\n", d.state, d.body));
            }
        }
    }
    out
}

// ── Script ────────────────────────────────────────────────────────────────

/// One self-invoking function per element, one listener per directive.
pub fn render_scripts(groups: &[DirectiveGroup<'_, JsEventDirective>]) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str("(function () {\n");
        out.push_str(&format!(
            "{INDENT}var el = document.querySelector('{}');\n",
            selector(group.data_id)
        ));
        out.push_str(&format!("{INDENT}if (!el) return;\n"));
        for d in &group.directives {
            if d.body.is_empty() {
                out.push_str(&format!("{INDENT}el.addEventListener('{}', function (event) {{}});\n", d.event));
            } else {
                out.push_str(&format!("{INDENT}el.addEventListener('{}', function (event) {{\n", d.event));
                out.push_str(&d.body);
                out.push('\n');
                out.push_str(&format!("{INDENT}}});\n"));
            }
        }
        out.push_str("})();\n");
    }
    out
}

// ── Escaping ──────────────────────────────────────────────────────────────

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
