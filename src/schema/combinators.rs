//! Combinator nodes: `//any`, `//all`, `//one`.
//!
//! Each combinator delegates to an ordered list of alternatives:
//!
//! - **Any**: accepted if at least one alternative accepts. Alternatives are
//!   tried in order and evaluation stops at the first acceptance. On
//!   rejection a single summary error is produced, not each alternative's.
//! - **All**: accepted only if every alternative accepts. Errors from every
//!   failing alternative are accumulated.
//! - **One**: accepted only if exactly one alternative accepts.
//!
//! `//any` without `of` accepts everything and compiles to a scalar leaf.

use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::trace;

use super::{combine_all, Schema};
use crate::compiler::CompileContext;
use crate::error::{CompileError, ErrorKind, ValidationErrors};
use crate::path::Path;
use crate::validation::ValidationContext;
use crate::CheckResult;

/// How a combinator counts accepting alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// At least one alternative.
    Any,
    /// Every alternative.
    All,
    /// Exactly one alternative.
    One,
}

impl Mode {
    fn describe(self) -> &'static str {
        match self {
            Mode::Any => "any",
            Mode::All => "all",
            Mode::One => "one",
        }
    }
}

pub(crate) struct CombinatorNode {
    mode: Mode,
    alternatives: Vec<Schema>,
}

impl CombinatorNode {
    pub(crate) fn build(
        mode: Mode,
        node: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Self, CompileError> {
        let specs = ctx.list_argument(node, "of")?;
        if specs.is_empty() {
            return Err(ctx.invalid_argument(
                "of",
                format!("'{}' needs at least one alternative", mode.describe()),
                &Value::Array(Vec::new()),
            ));
        }

        let alternatives = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| ctx.compile_at(&Path::root().push_key("of").push_index(i), spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { mode, alternatives })
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        match self.mode {
            Mode::Any => self.check_any(value, cx),
            Mode::All => self.check_all(value, cx),
            Mode::One => self.check_one(value, cx),
        }
    }

    fn alternative_cx(&self, cx: &ValidationContext, i: usize) -> ValidationContext {
        cx.within("of").within(i)
    }

    fn check_any(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        for (i, alternative) in self.alternatives.iter().enumerate() {
            if alternative.check_at(value, &self.alternative_cx(cx, i)).is_success() {
                trace!(alternative = i, "any: accepted");
                return Validation::Success(());
            }
        }

        let count = self.alternatives.len();
        Validation::Failure(ValidationErrors::single(
            cx.error(
                ErrorKind::None,
                format!("value matched none of {} alternatives", count),
                value,
            )
            .with_expected(format!("any of {} alternatives", count)),
        ))
    }

    fn check_all(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        combine_all(
            self.alternatives
                .iter()
                .enumerate()
                .map(|(i, alternative)| alternative.check_at(value, &self.alternative_cx(cx, i)))
                .collect::<Vec<_>>(),
        )
    }

    fn check_one(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        let matched: Vec<usize> = self
            .alternatives
            .iter()
            .enumerate()
            .filter(|(i, alternative)| {
                alternative
                    .check_at(value, &self.alternative_cx(cx, *i))
                    .is_success()
            })
            .map(|(i, _)| i)
            .collect();

        match matched.as_slice() {
            [_] => Validation::Success(()),
            [] => cx.fail(
                ErrorKind::None,
                format!("value matched none of {} alternatives", self.alternatives.len()),
                value,
            ),
            many => cx.fail(
                ErrorKind::Ambiguous,
                format!(
                    "value matched {} alternatives {:?}, expected exactly one",
                    many.len(),
                    many
                ),
                value,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TypeIdentifier;
    use crate::schema::{Node, ScalarNode};
    use serde_json::json;

    fn scalar(local: &str, node: ScalarNode) -> Schema {
        Schema::new(TypeIdentifier::core(local), Node::Scalar(node))
    }

    fn str_or_num(mode: Mode) -> CombinatorNode {
        CombinatorNode {
            mode,
            alternatives: vec![
                scalar(
                    "str",
                    ScalarNode::Str {
                        length: None,
                        allowed: None,
                    },
                ),
                scalar(
                    "num",
                    ScalarNode::Num {
                        integer: false,
                        range: None,
                        allowed: None,
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_any_summarizes_failure() {
        let node = str_or_num(Mode::Any);
        let cx = ValidationContext::root();

        assert!(node.check(&json!("x"), &cx).is_success());
        assert!(node.check(&json!(1), &cx).is_success());

        let errors = node.check(&json!(true), &cx).into_result().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.first().is(&ErrorKind::None));
        assert!(errors.first().message.contains('2'));
    }

    #[test]
    fn test_all_accumulates() {
        let node = str_or_num(Mode::All);
        let errors = node
            .check(&json!(null), &ValidationContext::root())
            .into_result()
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        let schema_paths: Vec<_> = errors.iter().map(|e| e.schema_path.to_string()).collect();
        assert_eq!(schema_paths, vec!["of[0]", "of[1]"]);
    }

    #[test]
    fn test_one_rejects_ambiguity() {
        let node = CombinatorNode {
            mode: Mode::One,
            alternatives: vec![
                scalar("any", ScalarNode::Any),
                scalar("def", ScalarNode::Def),
            ],
        };
        let cx = ValidationContext::root();

        let errors = node.check(&json!(1), &cx).into_result().unwrap_err();
        assert!(errors.first().is(&ErrorKind::Ambiguous));
        assert!(node.check(&json!(null), &cx).is_success());
    }
}
