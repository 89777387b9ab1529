//! Evaluation error types.
//!
//! This module provides [`ValidationError`] for single check failures and
//! [`ValidationErrors`] for accumulating several of them.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::path::Path;
use crate::CheckResult;

/// A tag classifying a validation failure.
///
/// A [`ValidationError`] carries an ordered list of these; the first tag is
/// the broad category and later tags, when present, refine it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The value has the wrong primitive shape.
    Type,
    /// The value has the right shape but is not an accepted value.
    Value,
    /// A number falls outside the declared range.
    Range,
    /// A string or sequence has the wrong length.
    Size,
    /// A required key is absent.
    Missing,
    /// A key is present that the record does not declare.
    Unexpected,
    /// No combinator alternative accepted the value.
    None,
    /// More than one alternative accepted where exactly one was required.
    Ambiguous,
    /// The type rejects every value.
    Fail,
    /// A plugin-defined tag.
    Custom(String),
}

impl ErrorKind {
    /// Returns the tag as written in diagnostics.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Type => "type",
            ErrorKind::Value => "value",
            ErrorKind::Range => "range",
            ErrorKind::Size => "size",
            ErrorKind::Missing => "missing",
            ErrorKind::Unexpected => "unexpected",
            ErrorKind::None => "none",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::Fail => "fail",
            ErrorKind::Custom(tag) => tag,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single check failure with full context.
///
/// - **kind**: ordered tags classifying the failure
/// - **message**: human-readable description
/// - **value**: the offending value
/// - **path**: where in the checked value the failure occurred
/// - **schema_path**: which part of the compiled schema rejected it
/// - **expected**: optional description of what would have been accepted
///
/// # Example
///
/// ```rust
/// use rxschema::{ErrorKind, Path, ValidationError};
/// use serde_json::json;
///
/// let error = ValidationError::new(ErrorKind::Type, "expected a string", json!(42))
///     .at(Path::root().push_key("name"))
///     .with_expected("string");
///
/// assert_eq!(error.kind, vec![ErrorKind::Type]);
/// assert_eq!(error.path.to_string(), "name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: Vec<ErrorKind>,
    pub message: String,
    pub value: Value,
    pub path: Path,
    pub schema_path: Path,
    pub expected: Option<String>,
}

impl ValidationError {
    /// Creates an error at the root with a single kind tag.
    pub fn new(kind: ErrorKind, message: impl Into<String>, value: Value) -> Self {
        Self {
            kind: vec![kind],
            message: message.into(),
            value,
            path: Path::root(),
            schema_path: Path::root(),
            expected: None,
        }
    }

    /// Sets the data path and returns self for chaining.
    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Sets the schema path and returns self for chaining.
    pub fn within(mut self, schema_path: Path) -> Self {
        self.schema_path = schema_path;
        self
    }

    /// Appends a refining kind tag and returns self for chaining.
    pub fn also(mut self, kind: ErrorKind) -> Self {
        self.kind.push(kind);
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Returns true if any of the kind tags equals `kind`.
    pub fn is(&self, kind: &ErrorKind) -> bool {
        self.kind.contains(kind)
    }

    fn kind_label(&self) -> String {
        self.kind
            .iter()
            .map(ErrorKind::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.path, self.kind_label(), self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        write!(f, " (got: {})", self.value)?;
        if !self.schema_path.is_root() {
            write!(f, " (schema: {})", self.schema_path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty collection of validation errors.
///
/// `ValidationErrors` wraps a `NonEmptyVec` so a failed check always carries
/// at least one error. It implements `Semigroup`, letting composite nodes
/// combine the failures of their children:
///
/// ```rust
/// use rxschema::{ErrorKind, Path, ValidationError, ValidationErrors};
/// use serde_json::json;
/// use stillwater::prelude::*;
///
/// let missing = ValidationErrors::single(
///     ValidationError::new(ErrorKind::Missing, "missing key 'a'", json!({}))
/// );
/// let unexpected = ValidationErrors::single(
///     ValidationError::new(ErrorKind::Unexpected, "unexpected key 'd'", json!(1))
///         .at(Path::root().push_key("d"))
/// );
///
/// assert_eq!(missing.combine(unexpected).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a vec, or None if the vec is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Turns accumulated errors into a check outcome: success when `errors`
    /// is empty, failure otherwise.
    pub fn outcome(errors: Vec<ValidationError>) -> CheckResult {
        match Self::from_vec(errors) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error, the representative one surfaced by `assert`.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns all errors whose data path equals `path`.
    pub fn at_path(&self, path: &Path) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors tagged with `kind`.
    pub fn of_kind(&self, kind: &ErrorKind) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.is(kind)).collect()
    }

    /// Moves the index step at `depth` of every data path forward by
    /// `offset`; used when a slice of a sequence was checked on its own.
    pub fn shift_index(self, depth: usize, offset: usize) -> Self {
        let shift = |error: &ValidationError| ValidationError {
            path: error.path.shift_index(depth, offset),
            ..error.clone()
        };
        self.iter()
            .skip(1)
            .fold(Self::single(shift(self.first())), |acc, error| {
                acc.combine(Self::single(shift(error)))
            })
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "check failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};
