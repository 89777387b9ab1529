//! Structural paths for locating values and schema nodes.
//!
//! A [`Path`] is used twice in every [`ValidationError`](crate::ValidationError):
//! once for the location inside the checked value (the data path) and once for
//! the location inside the compiled schema (the schema path). Compile errors use
//! it to point into the specification tree.

use std::fmt::{self, Display};

/// One structural step: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// A mapping key (e.g. `name`, `required`)
    Key(String),
    /// A sequence position (e.g. `[0]`, `[2]`)
    Index(usize),
}

impl Step {
    /// Returns the key if this step is a mapping key.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(key) => Some(key),
            Step::Index(_) => None,
        }
    }

    /// Returns the index if this step is a sequence position.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Step::Key(_) => None,
            Step::Index(idx) => Some(*idx),
        }
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<&String> for Step {
    fn from(key: &String) -> Self {
        Step::Key(key.clone())
    }
}

impl From<usize> for Step {
    fn from(idx: usize) -> Self {
        Step::Index(idx)
    }
}

/// A sequence of steps from an evaluation root.
///
/// Paths are persistent: [`Path::push`] returns a new path and leaves the
/// receiver untouched, so sibling branches of a tree walk never observe each
/// other's steps.
///
/// # Example
///
/// ```rust
/// use rxschema::Path;
///
/// let path = Path::root()
///     .push_key("contents")
///     .push_index(2)
///     .push_key("name");
///
/// assert_eq!(path.to_string(), "contents[2].name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Creates an empty path representing the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `step` appended.
    pub fn push(&self, step: impl Into<Step>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step.into());
        Self { steps }
    }

    /// Returns a new path with a key step appended.
    pub fn push_key(&self, key: impl Into<String>) -> Self {
        self.push(Step::Key(key.into()))
    }

    /// Returns a new path with an index step appended.
    pub fn push_index(&self, idx: usize) -> Self {
        self.push(Step::Index(idx))
    }

    /// Returns a new path with every step of `tail` appended.
    pub fn join(&self, tail: &Path) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(tail.steps.iter().cloned());
        Self { steps }
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Returns the last step, or None at the root.
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Returns a new path whose index step at `depth`, if any, is moved
    /// forward by `offset`.
    pub fn shift_index(&self, depth: usize, offset: usize) -> Self {
        let mut steps = self.steps.clone();
        if let Some(Step::Index(idx)) = steps.get_mut(depth) {
            *idx += offset;
        }
        Self { steps }
    }

    /// Returns the path without its last step, or None at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.steps.split_last()?;
        Some(Self {
            steps: init.to_vec(),
        })
    }
}

impl<S: Into<Step>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(root)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                Step::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
