//! Scalar leaf nodes.
//!
//! Leaves check a single value with no children: the trivial types
//! (`any`, `nil`, `def`, `fail`) and the constrained primitives (`bool`,
//! `num`, `int`, `str`). Constraint failures accumulate, so a string that is
//! both too long and not among the allowed values reports both.

use serde_json::{Map, Value};
use stillwater::Validation;

use super::range::same_number;
use super::Range;
use crate::compiler::CompileContext;
use crate::error::{CompileError, ErrorKind, ValidationError, ValidationErrors};
use crate::validation::ValidationContext;
use crate::CheckResult;

pub(crate) enum ScalarNode {
    Any,
    Nil,
    Def,
    Fail,
    Bool {
        value: Option<bool>,
    },
    Num {
        integer: bool,
        range: Option<Range>,
        allowed: Option<Allowed>,
    },
    Str {
        length: Option<Range>,
        allowed: Option<Allowed>,
    },
}

/// An enumeration of accepted values and the argument it came from.
pub(crate) struct Allowed {
    key: &'static str,
    items: Vec<Value>,
}

impl Allowed {
    fn describe(&self) -> String {
        match self.items.as_slice() {
            [single] => single.to_string(),
            many => format!("one of {}", Value::Array(many.to_vec())),
        }
    }
}

impl ScalarNode {
    pub(crate) fn bool(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let value = match node.get("value") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => return Err(ctx.invalid_argument("value", "'value' must be a bool", other)),
        };
        Ok(ScalarNode::Bool { value })
    }

    pub(crate) fn num(
        integer: bool,
        node: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Self, CompileError> {
        let range = ctx.range_argument(node, "range")?;
        let allowed = allowed_values(node, ctx, |v| v.is_number() && (!integer || is_integral(v)))?;
        Ok(ScalarNode::Num {
            integer,
            range,
            allowed,
        })
    }

    pub(crate) fn str(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let length = ctx.range_argument(node, "length")?;
        let allowed = allowed_values(node, ctx, Value::is_string)?;
        Ok(ScalarNode::Str { length, allowed })
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        match self {
            ScalarNode::Any => Validation::Success(()),
            ScalarNode::Nil => match value {
                Value::Null => Validation::Success(()),
                _ => cx.type_mismatch("nil", value),
            },
            ScalarNode::Def => match value {
                Value::Null => cx.fail(ErrorKind::Type, "expected a defined value, found nil", value),
                _ => Validation::Success(()),
            },
            ScalarNode::Fail => cx.fail(ErrorKind::Fail, "no value is accepted here", value),
            ScalarNode::Bool { value: expected } => match (value.as_bool(), expected) {
                (None, _) => cx.type_mismatch("bool", value),
                (Some(found), Some(expected)) if found != *expected => cx.fail(
                    ErrorKind::Value,
                    format!("expected {}, found {}", expected, found),
                    value,
                ),
                _ => Validation::Success(()),
            },
            ScalarNode::Num {
                integer,
                range,
                allowed,
            } => check_num(*integer, range.as_ref(), allowed.as_ref(), value, cx),
            ScalarNode::Str { length, allowed } => {
                check_str(length.as_ref(), allowed.as_ref(), value, cx)
            }
        }
    }
}

fn check_num(
    integer: bool,
    range: Option<&Range>,
    allowed: Option<&Allowed>,
    value: &Value,
    cx: &ValidationContext,
) -> CheckResult {
    let expected = if integer { "int" } else { "num" };
    let n = match value.as_number() {
        Some(n) if !integer || is_integral(value) => n,
        _ => return cx.type_mismatch(expected, value),
    };

    let mut errors = Vec::new();
    if let Some(range) = range {
        if !range.contains(n) {
            errors.push(
                cx.within("range")
                    .error(
                        ErrorKind::Range,
                        format!("{} is outside the range {}", value, range),
                        value,
                    )
                    .with_expected(range.to_string()),
            );
        }
    }
    if let Some(allowed) = allowed {
        let listed = allowed
            .items
            .iter()
            .filter_map(Value::as_number)
            .any(|candidate| same_number(candidate, n));
        if !listed {
            errors.push(not_allowed(cx, allowed, value));
        }
    }
    ValidationErrors::outcome(errors)
}

fn check_str(
    length: Option<&Range>,
    allowed: Option<&Allowed>,
    value: &Value,
    cx: &ValidationContext,
) -> CheckResult {
    let Some(s) = value.as_str() else {
        return cx.type_mismatch("str", value);
    };

    let mut errors = Vec::new();
    if let Some(length) = length {
        let count = s.chars().count();
        if !length.contains_len(count) {
            errors.push(
                cx.within("length")
                    .error(
                        ErrorKind::Size,
                        format!("length {} is outside the range {}", count, length),
                        value,
                    )
                    .with_expected(format!("length {}", length)),
            );
        }
    }
    if let Some(allowed) = allowed {
        if !allowed.items.iter().any(|candidate| candidate.as_str() == Some(s)) {
            errors.push(not_allowed(cx, allowed, value));
        }
    }
    ValidationErrors::outcome(errors)
}

fn not_allowed(cx: &ValidationContext, allowed: &Allowed, value: &Value) -> ValidationError {
    cx.within(allowed.key)
        .error(
            ErrorKind::Value,
            format!("{} is not an allowed value", value),
            value,
        )
        .with_expected(allowed.describe())
}

/// Reads the mutually exclusive `value` / `values` arguments.
fn allowed_values(
    node: &Map<String, Value>,
    ctx: &CompileContext<'_>,
    accepts: impl Fn(&Value) -> bool,
) -> Result<Option<Allowed>, CompileError> {
    match (node.get("value"), node.get("values")) {
        (Some(_), Some(values)) => Err(ctx.invalid_argument(
            "values",
            "'value' and 'values' cannot both be given",
            values,
        )),
        (Some(single), None) if accepts(single) => Ok(Some(Allowed {
            key: "value",
            items: vec![single.clone()],
        })),
        (Some(single), None) => Err(ctx.invalid_argument("value", "'value' has the wrong shape", single)),
        (None, Some(Value::Array(items))) => match items.iter().find(|item| !accepts(item)) {
            Some(item) => Err(ctx.invalid_argument(
                "values",
                "'values' holds an item of the wrong shape",
                item,
            )),
            None => Ok(Some(Allowed {
                key: "values",
                items: items.clone(),
            })),
        },
        (None, Some(other)) => Err(ctx.invalid_argument("values", "'values' must be a list", other)),
        (None, None) => Ok(None),
    }
}

/// Whether a JSON number denotes an integer, including floats like `3.0`.
pub(crate) fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first_error(result: CheckResult) -> ValidationError {
        result.into_result().unwrap_err().first().clone()
    }

    #[test]
    fn test_is_integral() {
        assert!(is_integral(&json!(3)));
        assert!(is_integral(&json!(-3)));
        assert!(is_integral(&json!(3.0)));
        assert!(!is_integral(&json!(3.5)));
        assert!(!is_integral(&json!("3")));
    }

    #[test]
    fn test_trivial_types() {
        let cx = ValidationContext::root();
        assert!(ScalarNode::Any.check(&json!(null), &cx).is_success());
        assert!(ScalarNode::Nil.check(&json!(null), &cx).is_success());
        assert!(ScalarNode::Nil.check(&json!(0), &cx).is_failure());
        assert!(ScalarNode::Def.check(&json!(false), &cx).is_success());
        assert!(ScalarNode::Def.check(&json!(null), &cx).is_failure());

        let error = first_error(ScalarNode::Fail.check(&json!(1), &cx));
        assert!(error.is(&ErrorKind::Fail));
    }

    #[test]
    fn test_int_rejects_fraction_as_type() {
        let node = ScalarNode::Num {
            integer: true,
            range: None,
            allowed: None,
        };
        let cx = ValidationContext::root();
        assert!(node.check(&json!(4), &cx).is_success());
        assert!(node.check(&json!(4.0), &cx).is_success());
        let error = first_error(node.check(&json!(4.5), &cx));
        assert!(error.is(&ErrorKind::Type));
    }

    #[test]
    fn test_str_accumulates_constraints() {
        let node = ScalarNode::Str {
            length: Range::from_spec(&json!({"max": 3})).ok(),
            allowed: Some(Allowed {
                key: "value",
                items: vec![json!("ab")],
            }),
        };
        let errors = node
            .check(&json!("abcd"), &ValidationContext::root())
            .into_result()
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.of_kind(&ErrorKind::Size).len(), 1);
        assert_eq!(errors.of_kind(&ErrorKind::Value).len(), 1);
    }

    #[test]
    fn test_length_counts_characters() {
        let node = ScalarNode::Str {
            length: Range::from_spec(&json!({"max": 2})).ok(),
            allowed: None,
        };
        assert!(node.check(&json!("éé"), &ValidationContext::root()).is_success());
    }

    #[test]
    fn test_int_values_compare_exactly() {
        let node = ScalarNode::Num {
            integer: true,
            range: None,
            allowed: Some(Allowed {
                key: "values",
                items: vec![json!(9007199254740993u64), json!(5)],
            }),
        };
        let cx = ValidationContext::root();
        assert!(node.check(&json!(9007199254740993u64), &cx).is_success());
        assert!(node.check(&json!(5.0), &cx).is_success());

        let error = first_error(node.check(&json!(9007199254740992u64), &cx));
        assert!(error.is(&ErrorKind::Value));
        assert_eq!(error.expected.as_deref(), Some("one of [9007199254740993,5]"));
    }
}
