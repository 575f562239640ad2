//! Type and custom-rule validation for resolved attribute values.

use crate::ast::LiteralValue;
use crate::catalog::{AttributeKind, AttributeSpec, SlotKind};
use crate::error::{CompileError, ErrorKind, Result};

/// Check `value` against `spec`; `line`/`col` locate the value in the source.
pub fn check(spec: &AttributeSpec, value: &LiteralValue, line: usize, col: usize) -> Result<()> {
    let invalid = |msg: String| CompileError::new(ErrorKind::InvalidValue, msg, line, col);
    let failed = |msg: String| {
        CompileError::new(
            ErrorKind::ValidationFailed,
            format!("Invalid value for attribute '{}': {}", spec.name, msg),
            line,
            col,
        )
    };

    match &spec.kind {
        AttributeKind::Number { check } => match value {
            LiteralValue::Number { value, .. } => match check {
                Some(f) => f(*value).map_err(failed),
                None => Ok(()),
            },
            // String stand-ins (`2px`, `50%`) are accepted as-is.
            LiteralValue::String(_) => Ok(()),
            other => Err(invalid(format!(
                "Attribute '{}' expects a number, got {}",
                spec.name,
                other.describe()
            ))),
        },

        AttributeKind::String { check } => match value {
            LiteralValue::String(s) | LiteralValue::Identifier(s) => match check {
                Some(f) => f(s).map_err(failed),
                None => Ok(()),
            },
            other => Err(invalid(format!(
                "Attribute '{}' expects a string, got {}",
                spec.name,
                other.describe()
            ))),
        },

        AttributeKind::Boolean => match value {
            LiteralValue::Identifier(b)
                if b.eq_ignore_ascii_case("true") || b.eq_ignore_ascii_case("false") =>
            {
                Ok(())
            }
            _ => Err(invalid(format!("Attribute '{}' expects 'true' or 'false'", spec.name))),
        },

        AttributeKind::Tuple { slots, check } => {
            let LiteralValue::Tuple(items) = value else {
                return Err(invalid(format!(
                    "Attribute '{}' expects a tuple of {} values, got {}",
                    spec.name,
                    slots.len(),
                    value.describe()
                )));
            };
            if items.len() != slots.len() {
                return Err(invalid(format!(
                    "Attribute '{}' expects a tuple of {} values, got {}",
                    spec.name,
                    slots.len(),
                    items.len()
                )));
            }

            let mut numeric = true;
            for (i, (slot, item)) in slots.iter().zip(items).enumerate() {
                let ok = match (slot, item) {
                    (SlotKind::Number, LiteralValue::Number { .. }) => true,
                    (SlotKind::Number, LiteralValue::String(_)) => {
                        numeric = false;
                        true
                    }
                    (SlotKind::String, LiteralValue::String(_)) => true,
                    (SlotKind::Identifier, LiteralValue::Identifier(_)) => true,
                    _ => false,
                };
                if !ok {
                    return Err(invalid(format!(
                        "Attribute '{}' expects {} in position {}, got {}",
                        spec.name,
                        slot_description(*slot),
                        i + 1,
                        item.describe()
                    )));
                }
            }

            // A string stand-in means the tuple is not purely numeric.
            match check {
                Some(f) if numeric => f(items).map_err(failed),
                _ => Ok(()),
            }
        }
    }
}

fn slot_description(slot: SlotKind) -> &'static str {
    match slot {
        SlotKind::Number => "a number",
        SlotKind::String => "a string",
        SlotKind::Identifier => "an identifier",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn spec(element: &str, attr: &str) -> &'static AttributeSpec {
        Catalog::global().get(element).unwrap().attribute(attr).unwrap()
    }

    fn num(raw: &str) -> LiteralValue {
        LiteralValue::number(raw).unwrap()
    }

    fn ident(s: &str) -> LiteralValue {
        LiteralValue::Identifier(s.into())
    }

    fn err(element: &str, attr: &str, value: LiteralValue) -> CompileError {
        check(spec(element, attr), &value, 1, 1).unwrap_err()
    }

    #[test]
    fn number_with_check() {
        assert!(check(spec("circle", "r"), &num("10"), 1, 1).is_ok());
        let e = err("circle", "r", num("-1"));
        assert_eq!(e.kind, ErrorKind::ValidationFailed);
        assert!(e.message.contains("'r'"));
    }

    #[test]
    fn number_accepts_string_stand_in() {
        assert!(check(spec("rect", "strokeWidth"), &LiteralValue::string("2px"), 1, 1).is_ok());
        assert_eq!(err("rect", "strokeWidth", ident("thick")).kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn string_accepts_identifiers() {
        assert!(check(spec("rect", "stroke"), &ident("#333"), 1, 1).is_ok());
        assert_eq!(err("rect", "id", num("5")).kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn string_custom_predicate() {
        assert!(check(spec("text", "letterSpacing"), &LiteralValue::string("2px"), 1, 1).is_ok());
        let e = err("text", "letterSpacing", LiteralValue::string("2em"));
        assert_eq!(e.kind, ErrorKind::ValidationFailed);
    }

    #[test]
    fn boolean() {
        assert!(check(spec("circle", "filled"), &ident("TRUE"), 1, 1).is_ok());
        let e = err("circle", "filled", LiteralValue::string("yes"));
        assert!(e.message.contains("expects 'true' or 'false'"));
    }

    #[test]
    fn tuple_arity() {
        let e = err("rect", "size", LiteralValue::Tuple(vec![num("1"), num("2"), num("3")]));
        assert_eq!(e.kind, ErrorKind::InvalidValue);
        assert!(e.message.contains("2 values, got 3"));
        assert_eq!(err("rect", "size", num("1")).kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn tuple_slot_kinds() {
        let font = |a, b, c| LiteralValue::Tuple(vec![a, b, c]);
        let good = font(num("12"), LiteralValue::string("Inter"), ident("bold"));
        assert!(check(spec("text", "font"), &good, 1, 1).is_ok());
        let bad = font(num("12"), ident("Inter"), ident("bold"));
        assert!(err("text", "font", bad).message.contains("position 2"));
    }

    #[test]
    fn tuple_check_skipped_for_string_stand_ins() {
        let negative = LiteralValue::Tuple(vec![num("-1"), num("10")]);
        assert_eq!(err("rect", "size", negative).kind, ErrorKind::ValidationFailed);
        let mixed = LiteralValue::Tuple(vec![num("-1"), LiteralValue::string("10px")]);
        assert!(check(spec("rect", "size"), &mixed, 1, 1).is_ok());
    }
}
