//! Evaluation context carried through a check.
//!
//! This module provides [`ValidationContext`], which tracks where a check
//! currently is: the data path inside the value and the schema path inside the
//! compiled tree. Composite nodes and plugins descend by deriving child
//! contexts; errors built from a context therefore always carry paths relative
//! to the evaluation root, however deep the delegation goes.

use serde_json::Value;

use crate::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::path::{Path, Step};
use crate::CheckResult;

/// Position of an in-progress check.
///
/// Contexts are cheap persistent values: every descent returns a new context
/// and leaves the parent unchanged.
///
/// # Example
///
/// ```rust
/// use rxschema::{ErrorKind, ValidationContext};
/// use serde_json::json;
///
/// let cx = ValidationContext::root().index(1).within("contents");
/// let error = cx.error(ErrorKind::Value, "not allowed", &json!("maybe"));
///
/// assert_eq!(error.path.to_string(), "[1]");
/// assert_eq!(error.schema_path.to_string(), "contents");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    path: Path,
    schema_path: Path,
}

impl ValidationContext {
    /// Creates the context for the root of an evaluation.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a context rooted at the given data path.
    pub fn at(path: Path) -> Self {
        Self {
            path,
            schema_path: Path::root(),
        }
    }

    /// Descends into a mapping entry of the checked value.
    pub fn field(&self, key: impl Into<String>) -> Self {
        Self {
            path: self.path.push_key(key),
            schema_path: self.schema_path.clone(),
        }
    }

    /// Descends into a sequence element of the checked value.
    pub fn index(&self, idx: usize) -> Self {
        Self {
            path: self.path.push_index(idx),
            schema_path: self.schema_path.clone(),
        }
    }

    /// Descends into a part of the schema without moving in the value.
    pub fn within(&self, step: impl Into<Step>) -> Self {
        Self {
            path: self.path.clone(),
            schema_path: self.schema_path.push(step),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Builds an error located at this context.
    pub fn error(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        value: &Value,
    ) -> ValidationError {
        ValidationError::new(kind, message, value.clone())
            .at(self.path.clone())
            .within(self.schema_path.clone())
    }

    /// Builds a single-error failure located at this context.
    pub fn fail(&self, kind: ErrorKind, message: impl Into<String>, value: &Value) -> CheckResult {
        stillwater::Validation::Failure(ValidationErrors::single(
            self.error(kind, message, value),
        ))
    }

    /// Builds the standard wrong-shape failure.
    pub fn type_mismatch(&self, expected: &str, value: &Value) -> CheckResult {
        stillwater::Validation::Failure(ValidationErrors::single(
            self.error(
                ErrorKind::Type,
                format!("expected {}, found {}", expected, type_name(value)),
                value,
            )
            .with_expected(expected),
        ))
    }
}

/// Returns the schema-language name for a value's primitive shape.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "num",
        Value::String(_) => "str",
        Value::Array(_) => "arr",
        Value::Object(_) => "map",
    }
}
