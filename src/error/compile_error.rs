//! Compilation error types.

use crate::error::ValidationErrors;
use crate::path::Path;
use crate::resolver::TypeIdentifier;

/// A type name could not be expanded to a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The shorthand names a prefix the table does not contain.
    #[error("unknown prefix '{prefix}' in type name '{name}'")]
    UnknownPrefix { prefix: String, name: String },

    /// The name is neither valid shorthand nor a canonical identifier.
    #[error("malformed type name '{name}': {reason}")]
    Malformed { name: String, reason: &'static str },
}

/// A specification could not be compiled.
///
/// Every variant aborts the whole `compile` call; no partial schema exists.
/// Locations (`at`) point into the specification tree passed to `compile`.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot resolve type name at {at}: {source}")]
    Resolution {
        #[source]
        source: ResolutionError,
        at: Path,
    },

    #[error("unknown type '{identifier}' at {at}")]
    UnknownType { identifier: TypeIdentifier, at: Path },

    /// The node's arguments do not satisfy the type's argument schema or
    /// its constructor's own checks.
    #[error("invalid arguments for '{identifier}': {errors}")]
    InvalidArgument {
        identifier: TypeIdentifier,
        errors: ValidationErrors,
    },

    /// The node is not a mapping or string, or lacks a usable `type` field.
    #[error("malformed specification node at {at}: {message}")]
    MalformedNode { at: Path, message: String },

    #[error("specification nesting exceeds the maximum depth of {max_depth} at {at}")]
    DepthExceeded { max_depth: usize, at: Path },
}

impl CompileError {
    /// Returns the specification location this error refers to.
    ///
    /// For argument errors this is the location of the first offending argument.
    pub fn location(&self) -> &Path {
        match self {
            CompileError::Resolution { at, .. }
            | CompileError::UnknownType { at, .. }
            | CompileError::MalformedNode { at, .. }
            | CompileError::DepthExceeded { at, .. } => at,
            CompileError::InvalidArgument { errors, .. } => &errors.first().path,
        }
    }

    pub fn is_unknown_type(&self) -> bool {
        matches!(self, CompileError::UnknownType { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CompileError::InvalidArgument { .. })
    }
}
