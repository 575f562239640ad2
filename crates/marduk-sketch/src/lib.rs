//! Compiler for the **Marduk Sketch** language (`.sketch`).
//!
//! A sketch document declares shapes, their styling, a few document-level
//! variables, and CSS-state / DOM-event directives. [`compile`] turns it into
//! one self-contained markup document: the element tree, followed by a
//! generated `<style>` section, a generated `<script>` section, and any raw
//! `style { }` / `script { }` blocks from the source.
//!
//! Compilation is a pure function of the input text. The crate does no I/O
//! and installs no logger; diagnostics go through the `log` facade at
//! `debug`/`trace` level.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`lexer`] | `Lexer`, `Token`, balanced-block scanning, CSS unit fusion |
//! | [`ast`] | `Root`, `ElementNode`, `LiteralValue`, directives, `VarsBlock` |
//! | [`catalog`] | `Catalog`, `Keyword`, `AttributeSpec`, `Produce` |
//! | [`validate`] | attribute value checks |
//! | [`vars`] | `Variables`: resolution and `$name` substitution |
//! | [`parser`] | `parse` entry point, special-block extraction |
//! | [`directives`] | `data_id`, `DirectiveCollector` |
//! | [`codegen`] | `generate` |
//! | [`error`] | `CompileError`, `ErrorKind` |
//!
//! # Quick start
//!
//! ```rust
//! use marduk_sketch::compile;
//!
//! let src = r#"
//!     vars { brand: #0070f3 }
//!     svg {
//!         size: (120, 40)
//!         rect { at: (0, 0) size: (120px, 40px) fill: $brand }
//!     }
//! "#;
//!
//! let out = compile(src).unwrap();
//! assert!(out.contains(r##"width="120px" height="40px" fill="#0070f3""##));
//! ```

pub mod ast;
pub mod catalog;
pub mod codegen;
pub mod directives;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod validate;
pub mod vars;

pub use ast::Root;
pub use catalog::Catalog;
pub use codegen::generate;
pub use error::{CompileError, ErrorKind, Result};
pub use parser::parse;

/// Compile `.sketch` source against the built-in catalog.
pub fn compile(source: &str) -> Result<String> {
    compile_with(source, Catalog::global())
}

/// Compile `.sketch` source against a caller-supplied catalog.
pub fn compile_with(source: &str, catalog: &Catalog) -> Result<String> {
    let root = parse(source, catalog)?;
    Ok(generate(&root, catalog))
}
