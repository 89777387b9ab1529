//! Error types for compilation and evaluation failures.
//!
//! Evaluation failures are values ([`ValidationError`], aggregated into
//! [`ValidationErrors`]) carrying a kind, message, offending value and paths.
//! Compilation failures ([`CompileError`], [`ResolutionError`]) abort the whole
//! `compile` call.

mod compile_error;
mod validation_error;

pub use compile_error::{CompileError, ResolutionError};
pub use validation_error::{ErrorKind, ValidationError, ValidationErrors};
