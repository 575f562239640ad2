//! End-to-end behaviour of `compile`: documented scenarios plus the
//! properties every document must satisfy.

use marduk_sketch::{CompileError, ErrorKind, compile};
use rstest::rstest;

fn ok(src: &str) -> String {
    match compile(src) {
        Ok(out) => out,
        Err(e) => panic!("expected success for {src:?}, got {e}"),
    }
}

fn err(src: &str) -> CompileError {
    match compile(src) {
        Ok(out) => panic!("expected failure for {src:?}, got output:\n{out}"),
        Err(e) => e,
    }
}

/// Every `data-identifier="..."` value in markup order.
fn data_ids(out: &str) -> Vec<&str> {
    out.split("data-identifier=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .collect()
}

// ── Scenarios ─────────────────────────────────────────────────────────────

#[test]
fn rect_attributes_map_to_markup() {
    let out = ok(r##"rect { at: (20,20) size: (100px,100px) radius: (8,8) stroke: #333 strokeWidth: 2 id:"box" }"##);
    assert!(
        out.contains(r##"x="20" y="20" width="100px" height="100px" rx="8" ry="8" stroke="#333" stroke-width="2" id="box""##),
        "{out}"
    );
}

#[test]
fn variable_in_tuple_is_inlined() {
    let out = ok("vars { width: 150 } svg { size: ($width, 100) }");
    assert!(out.contains(r#"width="150" height="100""#), "{out}");
}

#[test]
fn variable_aliasing_is_rejected() {
    let e = err("vars { a: 10 b: $a } svg { size: (100,100) }");
    assert_eq!(e.kind, ErrorKind::InvalidVariableValue);
    assert!(e.message.contains("Invalid variable value"), "{}", e.message);
    assert!(e.message.contains("literal values"), "{}", e.message);
}

#[test]
fn hover_rule_is_generated_once() {
    let out = ok(r##"svg { rect{ id:"box" } @hover { #box { stroke: #0070f3 } } }"##);
    let ids = data_ids(&out);
    assert_eq!(ids.len(), 1, "{out}");
    assert!(ids[0].starts_with("svg-"));

    let style = out.split("<style>").nth(1).and_then(|s| s.split("</style>").next()).unwrap_or_default();
    let rules: Vec<_> = style.lines().filter(|l| !l.is_empty()).collect();
    // Bodies are emitted verbatim, nested selector included.
    assert_eq!(
        rules,
        vec![format!("[data-identifier=\"{}\"]:hover {{ #box {{ stroke: #0070f3 }} }}", ids[0])],
        "{style}"
    );
}

#[test]
fn boolean_rejects_strings() {
    let e = err(r#"circle { r: 10 filled: "yes" }"#);
    assert!(e.message.contains("expects 'true' or 'false'"), "{}", e.message);
}

#[test]
fn undeclared_variable_is_named() {
    let e = err("rect { at:(0,0) size:($undeclared,10) }");
    assert_eq!(e.kind, ErrorKind::UndefinedVariable);
    assert!(e.message.contains("$undeclared"), "{}", e.message);
    assert!(e.message.contains("not defined"), "{}", e.message);
}

// ── Properties ────────────────────────────────────────────────────────────

#[rstest]
#[case("")]
#[case("svg { size: (10, 10) rect { at: (1, 1) fill: red } }")]
#[case("vars { c: #fff } rect { fill: $c @hover { fill: $c } on: click { go(); } }")]
#[case(r#"text { font: (12, "Inter", bold) "Hi" tspan { dy: 2 "there" } } style { body { margin: 0 } }"#)]
fn compilation_is_deterministic(#[case] src: &str) {
    assert_eq!(ok(src), ok(src));
}

#[rstest]
#[case("circle { }", "r", "circle { r: 5 }")]
#[case("ellipse { at: (5, 5) }", "radius", "ellipse { radius: (4, 2) }")]
#[case("line { from: (0, 0) }", "to", "line { from: (0, 0) to: (5, 5) }")]
#[case("line { to: (5, 5) }", "from", "line { from: (0, 0) to: (5, 5) }")]
#[case("path { stroke: red }", "d", r#"path { d: "M0 0 L10 10" }"#)]
#[case("polygon { }", "points", r#"polygon { points: "0,0 10,0 5,8" }"#)]
#[case("image { size: (10, 10) }", "href", r#"image { href: "a.png" }"#)]
fn required_attributes_are_enforced(#[case] missing: &str, #[case] attribute: &str, #[case] complete: &str) {
    let e = err(missing);
    assert_eq!(e.kind, ErrorKind::MissingAttribute);
    assert!(e.message.contains(&format!("'{attribute}'")), "{}", e.message);
    ok(complete);
}

#[rstest]
#[case("rect { at: (1) }")]
#[case("rect { at: (1, 2, 3) }")]
#[case("svg { viewBox: (0, 0, 10) }")]
#[case(r#"text { font: (12, "Inter") }"#)]
#[case("rect { size: 10 }")]
fn tuple_arity_mismatch_fails(#[case] src: &str) {
    let e = err(src);
    assert_eq!(e.kind, ErrorKind::InvalidValue);
    assert!(e.message.contains("expects a tuple of"), "{}", e.message);
}

#[rstest]
#[case("rect { at: (3, 4) }", r#"x="3" y="4""#)]
#[case("rect { size: (50%, 2em) }", r#"width="50%" height="2em""#)]
#[case("g { at: (3, 4) }", r#"transform="translate(3, 4)""#)]
#[case("svg { viewBox: (0, 0, 8, 6) }", r#"viewBox="0 0 8 6""#)]
#[case(r#"text { font: (12, "Inter", bold) }"#, r#"font-size="12" font-family="Inter" font-weight="bold""#)]
fn tuple_slots_map_through_produce(#[case] src: &str, #[case] expected: &str) {
    let out = ok(src);
    assert!(out.contains(expected), "{out}");
}

#[rstest]
#[case("rect { at: (2s, 90deg) size: (150ms, 1) }", r#"x="2s" y="90deg" width="150ms" height="1""#)]
#[case("rect { at: (infinite, 0) size: (auto, AUTO) }", r#"x="infinite" y="0" width="auto" height="AUTO""#)]
#[case("rect { at: (INFINITE, 2PX) }", r#"x="INFINITE" y="2PX""#)]
#[case("rect { fill: None }", r#"fill="None""#)]
fn css_values_fuse_end_to_end(#[case] src: &str, #[case] expected: &str) {
    let out = ok(src);
    assert!(out.contains(expected), "{out}");
}

#[test]
fn units_must_touch_their_number() {
    let e = err("rect { size: (2 px, 3) }");
    assert_eq!(e.kind, ErrorKind::Syntax);
    assert_eq!(e.message, "Expected ',' or ')' in tuple, got 'px'");
    assert_eq!((e.line, e.col), (1, 17));
}

#[rstest]
#[case("rect { on: click { go()// }\n } }", "go()// }")]
#[case("rect { on: click { x = \"a\"// }\n } }", "x = \"a\"// }")]
#[case("rect { on: click { log(\"}\"); } }", "log(\"}\");")]
#[case("rect { on: click { log('{'); /* } */ } }", "log('{'); /* } */")]
#[case("rect { on: click { el.title = `${n} }`; } }", "el.title = `${n} }`;")]
fn handler_bodies_keep_closing_braces(#[case] src: &str, #[case] body: &str) {
    let out = ok(src);
    assert!(out.contains(&format!("function (event) {{\n{body}\n  }});")), "{out}");
}

#[rstest]
#[case("rect { @hover { background: url(http://x.test/a.png) } }", "background: url(http://x.test/a.png)")]
#[case("rect { @hover { background: url(//cdn.test/a.png) } }", "background: url(//cdn.test/a.png)")]
#[case("style { a { background: url(https://x.test/b.png) } }", "a { background: url(https://x.test/b.png) }")]
#[case("script { go()// }\n}", "go()// }")]
fn urls_survive_block_scanning(#[case] src: &str, #[case] kept: &str) {
    let out = ok(src);
    assert!(out.contains(kept), "{out}");
}

#[rstest]
#[case("text { font: (bold, \"Inter\", 12) }")]
#[case("text { font: (12, Inter, bold) }")]
#[case("rect { at: (left, 2) }")]
fn tuple_slot_kinds_are_checked(#[case] src: &str) {
    assert_eq!(err(src).kind, ErrorKind::InvalidValue);
}

#[rstest]
#[case(
    "vars { w: 150 h: 90 } svg { size: ($w, $h) }",
    "svg { size: (150, 90) }"
)]
#[case(
    r##"vars { brand: #0070f3 label: "Go" } rect { fill: $brand id: $label }"##,
    r##"rect { fill: #0070f3 id: "Go" }"##
)]
#[case("vars { dash: (4, 2) } line { from: (0, 0) to: (1, 1) dash: $dash }", "line { from: (0, 0) to: (1, 1) dash: (4, 2) }")]
#[case("vars { t: \"Hello\" } text { $t }", "text { \"Hello\" }")]
fn inlined_variables_match_literals(#[case] with_vars: &str, #[case] inlined: &str) {
    assert_eq!(ok(with_vars), ok(inlined));
}

#[rstest]
#[case("rect { fill: $missing }")]
#[case("rect { at: (0, $missing) }")]
#[case("rect { @hover { fill: $missing } }")]
#[case("rect { on: click { paint($missing); } }")]
#[case("text { $missing }")]
fn unresolved_references_name_the_variable(#[case] src: &str) {
    let e = err(src);
    assert_eq!(e.kind, ErrorKind::UndefinedVariable);
    assert!(e.message.contains("$missing"), "{}", e.message);
}

#[test]
fn directives_share_one_data_id() {
    let out = ok("svg { rect { at: (0, 0) @hover { fill: red; } on: click { alert('hi'); } } }");
    let ids = data_ids(&out);
    assert_eq!(ids.len(), 1, "{out}");
    let id = ids[0];
    assert!(id.starts_with("rect-"));
    assert!(out.contains(&format!("[data-identifier=\"{id}\"]:hover {{ fill: red; }}")), "{out}");
    assert!(out.contains(&format!("document.querySelector('[data-identifier=\"{id}\"]')")), "{out}");
    assert!(out.contains("alert('hi');"));
}

#[test]
fn sibling_elements_get_distinct_ids() {
    let out = ok("svg {\n  rect { @hover { fill: red } }\n  rect { @hover { fill: blue } }\n}");
    let ids = data_ids(&out);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

// ── Errors ────────────────────────────────────────────────────────────────

#[rstest]
#[case(r#"text { "abc }"#, ErrorKind::UnterminatedString)]
#[case("svg { rect { }", ErrorKind::UnterminatedBlock)]
#[case("rect { } /* trailing", ErrorKind::UnterminatedComment)]
#[case("rect { on: click { `abc } }", ErrorKind::UnterminatedTemplate)]
#[case("rect { fill: $ }", ErrorKind::MalformedVariable)]
fn lexical_errors(#[case] src: &str, #[case] kind: ErrorKind) {
    let e = err(src);
    assert_eq!(e.kind, kind);
    assert!(e.kind.is_lexical());
}

#[rstest]
#[case("blob { }", ErrorKind::UnknownElement)]
#[case("rect { fill: red colour: red }", ErrorKind::UnknownAttribute)]
#[case("rect { fill: red fill: blue }", ErrorKind::DuplicateAttribute)]
#[case("rect { opacity: 2 }", ErrorKind::ValidationFailed)]
#[case("rect { @hovering { } }", ErrorKind::UnknownState)]
#[case("rect { on: tap { } }", ErrorKind::UnknownEvent)]
#[case(r#"circle { r: 1 "label" }"#, ErrorKind::TextNotAllowed)]
#[case("rect { circle { r: 1 } }", ErrorKind::ChildNotAllowed)]
#[case("vars { a: 1 a: 2 }", ErrorKind::DuplicateVariable)]
#[case("rect", ErrorKind::Syntax)]
fn semantic_errors(#[case] src: &str, #[case] kind: ErrorKind) {
    let e = err(src);
    assert_eq!(e.kind, kind, "{e}");
    assert!(!e.kind.is_lexical());
}

#[test]
fn errors_carry_positions() {
    let e = err("svg {\n  rect {\n    fill: $nope\n  }\n}");
    assert_eq!((e.line, e.col), (3, 11));
    assert_eq!(e.to_string(), "sketch error at 3:11: Variable '$nope' is not defined");
}

// ── Output layout ─────────────────────────────────────────────────────────

#[test]
fn sections_follow_markup_in_order() {
    let out = ok(
        "rect { @hover { fill: red } on: click { go(); } }\nscript { boot(); }\nstyle { body { margin: 0 } }",
    );
    let markup = out.find("<rect").unwrap();
    let generated_style = out.find("]:hover").unwrap();
    let generated_script = out.find("addEventListener").unwrap();
    let special_script = out.find("boot();").unwrap();
    let special_style = out.find("margin: 0").unwrap();
    assert!(markup < generated_style);
    assert!(generated_style < generated_script);
    assert!(generated_script < special_script);
    assert!(special_script < special_style);
}

#[test]
fn documents_without_directives_have_no_sections() {
    let out = ok("svg { size: (10, 10) }");
    assert!(!out.contains("<style>"));
    assert!(!out.contains("<script>"));
    assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
}
