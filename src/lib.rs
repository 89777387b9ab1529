//! # rxschema
//!
//! A compile-then-check schema engine. Schemas are written as data
//! (JSON-compatible values), compiled once into an immutable validator tree,
//! and evaluated against any number of values.
//!
//! ## Overview
//!
//! Type names are URI-shaped identifiers, usually written in prefix
//! shorthand (`//str`, `/example/csv`). An [`Engine`] resolves those names,
//! checks every node's arguments against the type's own argument schema, and
//! builds a [`Schema`] tree of scalar, collection, combinator, and plugin
//! nodes. Checking a value collects ALL errors through stillwater's
//! `Validation`; [`Schema::assert`] surfaces only the first.
//!
//! ## Core Types
//!
//! - [`Engine`] / [`EngineConfig`]: the sealed registry and its builder
//! - [`Schema`]: a compiled, thread-safe validator tree
//! - [`ValidationError`] / [`ValidationErrors`]: structured check failures
//!   with data path and schema path
//! - [`CompileError`]: why a specification did not compile
//! - [`TypePlugin`]: the interface for externally defined types
//!
//! ## Example
//!
//! ```rust
//! use rxschema::{Engine, ErrorKind};
//! use serde_json::json;
//!
//! let engine = Engine::default();
//! let schema = engine
//!     .compile(&json!({
//!         "type": "//rec",
//!         "required": {
//!             "id": "//int",
//!             "tags": { "type": "//arr", "contents": "//str" },
//!         },
//!     }))
//!     .unwrap();
//!
//! assert!(schema.check(&json!({ "id": 1, "tags": ["a"] })).is_success());
//!
//! let errors = schema
//!     .check(&json!({ "tags": ["a", 2], "extra": true }))
//!     .into_result()
//!     .unwrap_err();
//! assert_eq!(errors.len(), 3);
//! assert!(errors.first().is(&ErrorKind::Missing));
//! ```

pub mod compiler;
pub mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use compiler::CompileContext;
pub use engine::{ConfigError, Engine, EngineConfig, DEFAULT_MAX_DEPTH};
pub use error::{CompileError, ErrorKind, ResolutionError, ValidationError, ValidationErrors};
pub use path::{Path, Step};
pub use registry::RegistryError;
pub use resolver::{resolve, PrefixTable, TypeIdentifier, CORE_BASE, META_BASE};
pub use schema::{Category, Mode, Schema, TypePlugin};
pub use validation::{type_name, ValidationContext};

/// Outcome of checking a value: success, or every error found.
pub type CheckResult = stillwater::Validation<(), ValidationErrors>;
