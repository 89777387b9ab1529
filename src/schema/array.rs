//! Sequence collections: homogeneous arrays and positional sequences.

use serde_json::{Map, Value};
use stillwater::Validation;

use super::{combine_all, Range, Schema};
use crate::compiler::CompileContext;
use crate::error::{CompileError, ErrorKind, ValidationErrors};
use crate::path::Path;
use crate::validation::ValidationContext;
use crate::CheckResult;

/// `//arr`: every element matches one schema.
pub(crate) struct ArrNode {
    contents: Box<Schema>,
    length: Option<Range>,
}

impl ArrNode {
    pub(crate) fn build(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let contents = ctx.compile_in("contents", ctx.required(node, "contents")?)?;
        let length = ctx.range_argument(node, "length")?;
        Ok(Self {
            contents: Box::new(contents),
            length,
        })
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        let Some(items) = value.as_array() else {
            return cx.type_mismatch("arr", value);
        };

        let size = self.length.as_ref().and_then(|length| {
            (!length.contains_len(items.len())).then(|| {
                cx.within("length")
                    .fail(
                        ErrorKind::Size,
                        format!("{} elements, expected length {}", items.len(), length),
                        value,
                    )
            })
        });

        let contents = cx.within("contents");
        let elements = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.contents.check_at(item, &contents.index(i)));

        combine_all(size.into_iter().chain(elements))
    }
}

/// `//seq`: a fixed positional prefix, optionally followed by a tail.
///
/// The elements after the prefix are checked together, as one array, against
/// the tail schema. Errors inside that array are shifted back to the element's
/// real index in the sequence.
pub(crate) struct SeqNode {
    contents: Vec<Schema>,
    tail: Option<Box<Schema>>,
}

impl SeqNode {
    pub(crate) fn build(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let contents = ctx
            .list_argument(node, "contents")?
            .iter()
            .enumerate()
            .map(|(i, spec)| ctx.compile_at(&Path::root().push_key("contents").push_index(i), spec))
            .collect::<Result<Vec<_>, _>>()?;

        let tail = node
            .get("tail")
            .map(|spec| ctx.compile_in("tail", spec).map(Box::new))
            .transpose()?;

        Ok(Self { contents, tail })
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        let Some(items) = value.as_array() else {
            return cx.type_mismatch("arr", value);
        };

        let mut results = Vec::with_capacity(items.len() + 1);

        if items.len() < self.contents.len() {
            results.push(size_failure(
                cx.within("contents"),
                ErrorKind::Missing,
                format!(
                    "{} elements, expected at least {}",
                    items.len(),
                    self.contents.len()
                ),
                value,
            ));
        }

        for (i, (schema, item)) in self.contents.iter().zip(items).enumerate() {
            results.push(schema.check_at(item, &cx.index(i).within("contents").within(i)));
        }

        match &self.tail {
            Some(tail) if items.len() >= self.contents.len() => {
                let offset = self.contents.len();
                let surplus = Value::Array(items[offset..].to_vec());
                let depth = cx.path().len();
                results.push(match tail.check_at(&surplus, &cx.within("tail")) {
                    Validation::Failure(errors) => {
                        Validation::Failure(errors.shift_index(depth, offset))
                    }
                    success => success,
                });
            }
            None if items.len() > self.contents.len() => {
                results.push(size_failure(
                    cx.clone(),
                    ErrorKind::Unexpected,
                    format!(
                        "{} elements, expected at most {}",
                        items.len(),
                        self.contents.len()
                    ),
                    value,
                ));
            }
            _ => {}
        }

        combine_all(results)
    }
}

/// A wrong-length sequence, refined by whether positions are missing or surplus.
fn size_failure(
    cx: ValidationContext,
    refinement: ErrorKind,
    message: String,
    value: &Value,
) -> CheckResult {
    Validation::Failure(ValidationErrors::single(
        cx.error(ErrorKind::Size, message, value).also(refinement),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::schema::{CollectionNode, Node, ScalarNode};
    use crate::resolver::TypeIdentifier;
    use serde_json::json;

    fn str_schema() -> Schema {
        Schema::new(
            TypeIdentifier::core("str"),
            Node::Scalar(ScalarNode::Str {
                length: None,
                allowed: None,
            }),
        )
    }

    fn fails(result: CheckResult) -> Vec<ValidationError> {
        result.into_result().unwrap_err().into_vec()
    }

    #[test]
    fn test_arr_reports_every_bad_element() {
        let node = ArrNode {
            contents: Box::new(str_schema()),
            length: None,
        };
        let errors = fails(node.check(&json!(["a", 1, "b", 2]), &ValidationContext::root()));

        let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
        assert_eq!(errors[0].schema_path.to_string(), "contents");
    }

    fn str_arr(length: Option<Range>) -> Schema {
        Schema::new(
            TypeIdentifier::core("arr"),
            Node::Collection(CollectionNode::Arr(ArrNode {
                contents: Box::new(str_schema()),
                length,
            })),
        )
    }

    #[test]
    fn test_seq_tail_checks_surplus_as_array() {
        let node = SeqNode {
            contents: vec![str_schema()],
            tail: Some(Box::new(str_arr(None))),
        };
        let cx = ValidationContext::root().field("row");
        assert!(node.check(&json!(["a", "b", "c"]), &cx).is_success());

        let errors = fails(node.check(&json!(["a", "b", 3]), &cx));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "row[2]");
        assert_eq!(errors[0].schema_path.to_string(), "tail.contents");
    }

    #[test]
    fn test_seq_tail_sees_empty_surplus() {
        let node = SeqNode {
            contents: vec![str_schema()],
            tail: Some(Box::new(str_arr(Range::from_spec(&json!({"min": 1})).ok()))),
        };
        let errors = fails(node.check(&json!(["a"]), &ValidationContext::root()));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].is(&ErrorKind::Size));
        assert!(errors[0].path.is_root());
        assert_eq!(errors[0].value, json!([]));
        assert_eq!(errors[0].schema_path.to_string(), "tail.length");
    }

    #[test]
    fn test_seq_without_tail_rejects_surplus() {
        let node = SeqNode {
            contents: vec![str_schema()],
            tail: None,
        };
        let errors = fails(node.check(&json!(["a", "b"]), &ValidationContext::root()));
        assert!(errors[0].is(&ErrorKind::Size));
        assert!(errors[0].is(&ErrorKind::Unexpected));
        assert!(errors[0].to_string().contains("[size/unexpected]"));
    }
}
