//! Numeric ranges used by `range` and `length` arguments.
//!
//! Bounds keep the JSON number they were written as. Two integers compare
//! exactly; anything involving a float compares as `f64`.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde_json::{Number, Value};

/// Inclusive and exclusive bounds, each optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Range {
    min: Option<Number>,
    max: Option<Number>,
    min_ex: Option<Number>,
    max_ex: Option<Number>,
}

fn exact(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Orders two JSON numbers, exactly when both are integers.
pub(crate) fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    match (exact(a), exact(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Numeric equality across representations, so `3` equals `3.0`.
pub(crate) fn same_number(a: &Number, b: &Number) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

impl Range {
    /// Reads a range argument of the form `{min, max, min-ex, max-ex}`.
    ///
    /// On failure returns the offending key (empty for a non-mapping) and a message.
    pub(crate) fn from_spec(spec: &Value) -> Result<Self, (String, String)> {
        let map = spec
            .as_object()
            .ok_or_else(|| (String::new(), "a range must be a mapping".to_string()))?;

        let mut range = Range::default();
        for (key, bound) in map {
            let n = bound
                .as_number()
                .cloned()
                .ok_or_else(|| (key.clone(), format!("range bound '{}' must be a number", key)))?;
            match key.as_str() {
                "min" => range.min = Some(n),
                "max" => range.max = Some(n),
                "min-ex" => range.min_ex = Some(n),
                "max-ex" => range.max_ex = Some(n),
                _ => return Err((key.clone(), format!("unknown range bound '{}'", key))),
            }
        }
        Ok(range)
    }

    pub(crate) fn contains(&self, n: &Number) -> bool {
        let holds = |bound: &Option<Number>, accept: fn(Ordering) -> bool| {
            bound
                .as_ref()
                .map_or(true, |bound| compare(n, bound).is_some_and(accept))
        };
        holds(&self.min, Ordering::is_ge)
            && holds(&self.max, Ordering::is_le)
            && holds(&self.min_ex, Ordering::is_gt)
            && holds(&self.max_ex, Ordering::is_lt)
    }

    /// Whether a collection or string of `len` items fits the range.
    pub(crate) fn contains_len(&self, len: usize) -> bool {
        self.contains(&Number::from(len))
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds: Vec<String> = [
            self.min.as_ref().map(|n| format!(">= {}", n)),
            self.min_ex.as_ref().map(|n| format!("> {}", n)),
            self.max.as_ref().map(|n| format!("<= {}", n)),
            self.max_ex.as_ref().map(|n| format!("< {}", n)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if bounds.is_empty() {
            write!(f, "any")
        } else {
            write!(f, "{}", bounds.join(" and "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(value: Value) -> Number {
        value.as_number().cloned().unwrap()
    }

    #[test]
    fn test_inclusive_bounds() {
        let range = Range::from_spec(&json!({"min": 1, "max": 3})).unwrap();
        assert!(range.contains(&num(json!(1))));
        assert!(range.contains(&num(json!(3.0))));
        assert!(!range.contains(&num(json!(0.5))));
        assert!(!range.contains(&num(json!(3.5))));
        assert!(range.contains_len(2));
    }

    #[test]
    fn test_exclusive_bounds() {
        let range = Range::from_spec(&json!({"min-ex": 0, "max-ex": 1})).unwrap();
        assert!(range.contains(&num(json!(0.5))));
        assert!(!range.contains(&num(json!(0))));
        assert!(!range.contains(&num(json!(1))));
    }

    #[test]
    fn test_empty_range_accepts_all() {
        let range = Range::from_spec(&json!({})).unwrap();
        assert!(range.contains(&num(json!(i64::MIN))));
        assert_eq!(range.to_string(), "any");
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let range = Range::from_spec(&json!({"max": 9007199254740992u64})).unwrap();
        assert!(range.contains(&num(json!(9007199254740992u64))));
        assert!(!range.contains(&num(json!(9007199254740993u64))));

        let above = Range::from_spec(&json!({"min-ex": u64::MAX - 1})).unwrap();
        assert!(above.contains(&num(json!(u64::MAX))));
    }

    #[test]
    fn test_same_number_across_representations() {
        assert!(same_number(&num(json!(3)), &num(json!(3.0))));
        assert!(!same_number(&num(json!(9007199254740993u64)), &num(json!(9007199254740992u64))));
    }

    #[test]
    fn test_display() {
        let range = Range::from_spec(&json!({"min": 2, "max-ex": 10})).unwrap();
        assert_eq!(range.to_string(), ">= 2 and < 10");
    }

    #[test]
    fn test_rejects_bad_specs() {
        assert!(Range::from_spec(&json!([1, 2])).is_err());
        assert_eq!(
            Range::from_spec(&json!({"min": "one"})).unwrap_err().0,
            "min"
        );
        assert_eq!(
            Range::from_spec(&json!({"least": 1})).unwrap_err().0,
            "least"
        );
    }
}
