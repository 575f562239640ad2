//! Per-element identity for directives, and grouping of directives by owner.

use std::collections::HashMap;

use crate::ast::{CssStateDirective, ElementNode, JsEventDirective, Node, Root};

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Stable identifier for the element `name` declared at `line`:`col`.
///
/// FNV-1a over the name and the position, so the same source always yields
/// the same id and elements at different positions get different ids.
pub fn data_id(name: &str, line: usize, col: usize) -> String {
    let bytes = name
        .bytes()
        .chain([0])
        .chain((line as u64).to_le_bytes())
        .chain((col as u64).to_le_bytes());
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{name}-{hash:08x}")
}

/// All directives owned by one element, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveGroup<'a, D> {
    pub data_id: &'a str,
    pub directives: Vec<&'a D>,
}

/// Directives of a whole document, grouped by `data_id` in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Directives<'a> {
    pub styles: Vec<DirectiveGroup<'a, CssStateDirective>>,
    pub scripts: Vec<DirectiveGroup<'a, JsEventDirective>>,
}

#[derive(Default)]
pub struct DirectiveCollector<'a> {
    styles: Vec<DirectiveGroup<'a, CssStateDirective>>,
    scripts: Vec<DirectiveGroup<'a, JsEventDirective>>,
    style_index: HashMap<&'a str, usize>,
    script_index: HashMap<&'a str, usize>,
}

impl<'a> DirectiveCollector<'a> {
    pub fn collect(root: &'a Root) -> Directives<'a> {
        let mut collector = Self::default();
        for element in &root.elements {
            collector.visit(element);
        }
        Directives { styles: collector.styles, scripts: collector.scripts }
    }

    fn visit(&mut self, element: &'a ElementNode) {
        for d in &element.css_states {
            add(&mut self.styles, &mut self.style_index, &d.data_id, d);
        }
        for d in &element.js_events {
            add(&mut self.scripts, &mut self.script_index, &d.data_id, d);
        }
        for child in &element.children {
            if let Node::Element(e) = child {
                self.visit(e);
            }
        }
    }
}

fn add<'a, D>(
    groups: &mut Vec<DirectiveGroup<'a, D>>,
    index: &mut HashMap<&'a str, usize>,
    data_id: &'a str,
    directive: &'a D,
) {
    let slot = *index.entry(data_id).or_insert_with(|| {
        groups.push(DirectiveGroup { data_id, directives: Vec::new() });
        groups.len() - 1
    });
    groups[slot].directives.push(directive);
}
