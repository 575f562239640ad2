//! Document-level `vars { ... }` table and `$name` substitution.

use std::collections::HashMap;

use crate::ast::{LiteralValue, VarsBlock};
use crate::error::{CompileError, ErrorKind, Result};
use crate::lexer::{is_variable_char, is_variable_start};

/// Name → literal mapping for one document.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, LiteralValue>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table, rejecting duplicates and values that are not pure
    /// literals (`b: $a`).
    pub fn from_block(block: &VarsBlock) -> Result<Self> {
        let mut values = HashMap::with_capacity(block.declarations.len());
        for decl in &block.declarations {
            if !decl.value.is_resolved() {
                return Err(CompileError::new(
                    ErrorKind::InvalidVariableValue,
                    format!(
                        "Invalid variable value for '{}': variables can only hold literal values",
                        decl.name
                    ),
                    decl.line,
                    decl.col,
                ));
            }
            if values.insert(decl.name.clone(), decl.value.clone()).is_some() {
                return Err(CompileError::new(
                    ErrorKind::DuplicateVariable,
                    format!("Variable '{}' is declared more than once", decl.name),
                    decl.line,
                    decl.col,
                ));
            }
        }
        Ok(Self { values })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Replace every variable reference in `value`, descending into tuples.
    pub fn resolve(&self, value: LiteralValue) -> Result<LiteralValue> {
        match value {
            LiteralValue::VariableReference { name, line, col } => match self.values.get(&name) {
                Some(v) => Ok(v.clone()),
                None => Err(undefined(&name, line, col)),
            },
            LiteralValue::Tuple(items) => items
                .into_iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>>>()
                .map(LiteralValue::Tuple),
            other => Ok(other),
        }
    }

    /// Substitute `$name` occurrences in a raw directive body.
    ///
    /// `line`/`col` is the absolute position of the first character of
    /// `body`, used to locate undefined names. A `$` that does not start an
    /// identifier (`${`, `$(`) is kept verbatim.
    pub fn substitute(&self, body: &str, line: usize, col: usize) -> Result<String> {
        let mut out = String::with_capacity(body.len());
        let (mut line, mut col) = (line, col);
        let mut chars = body.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if ch == '$' && matches!(chars.peek(), Some(&(_, c)) if is_variable_start(c)) {
                let mut end = body.len();
                while let Some(&(j, c)) = chars.peek() {
                    if !is_variable_char(c) {
                        end = j;
                        break;
                    }
                    chars.next();
                }
                let name = &body[i + 1..end];
                let value = self.values.get(name).ok_or_else(|| undefined(name, line, col))?;
                out.push_str(&value.to_string());
                col += end - i;
                continue;
            }

            out.push(ch);
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Ok(out)
    }
}

fn undefined(name: &str, line: usize, col: usize) -> CompileError {
    CompileError::new(
        ErrorKind::UndefinedVariable,
        format!("Variable '${name}' is not defined"),
        line,
        col,
    )
}
