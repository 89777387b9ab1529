//! Compiled schemas and their evaluation.
//!
//! A [`Schema`] is the immutable validator tree produced by
//! [`Engine::compile`](crate::Engine::compile). Every node belongs to one of
//! four categories: scalar leaves, collections, combinators, and plugin
//! nodes. Built-in categories are dispatched with a closed `match`; plugin
//! nodes hold an opaque, owned implementation of [`TypePlugin`].
//!
//! # Example
//!
//! ```rust
//! use rxschema::{Engine, EngineConfig};
//! use serde_json::json;
//!
//! let engine = Engine::new(EngineConfig::new()).unwrap();
//! let schema = engine
//!     .compile(&json!({ "type": "//arr", "contents": "//str" }))
//!     .unwrap();
//!
//! assert!(schema.check(&json!(["a", "b"])).is_success());
//!
//! let error = schema.assert(&json!(["a", 7])).unwrap_err();
//! assert_eq!(error.path.to_string(), "[1]");
//! ```

mod array;
mod combinators;
mod plugin;
mod range;
mod record;
mod scalar;

use std::fmt;

use rayon::prelude::*;
use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;
use tracing::trace;

use crate::error::ValidationError;
use crate::resolver::TypeIdentifier;
use crate::validation::ValidationContext;
use crate::CheckResult;

pub(crate) use array::{ArrNode, SeqNode};
pub use combinators::Mode;
pub(crate) use combinators::CombinatorNode;
pub(crate) use plugin::{DynPlugin, PluginCheck};
pub use plugin::TypePlugin;
pub(crate) use range::Range;
pub(crate) use record::{MapNode, RecNode};
pub(crate) use scalar::ScalarNode;

/// The category of a compiled node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Scalar,
    Collection,
    Combinator,
    Plugin,
}

/// Collection nodes: sequences and keyed mappings.
pub(crate) enum CollectionNode {
    Arr(ArrNode),
    Seq(SeqNode),
    Map(MapNode),
    Rec(RecNode),
}

impl CollectionNode {
    fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        match self {
            CollectionNode::Arr(node) => node.check(value, cx),
            CollectionNode::Seq(node) => node.check(value, cx),
            CollectionNode::Map(node) => node.check(value, cx),
            CollectionNode::Rec(node) => node.check(value, cx),
        }
    }
}

/// Folds child outcomes into one, accumulating every failure in order.
pub(crate) fn combine_all(results: impl IntoIterator<Item = CheckResult>) -> CheckResult {
    results
        .into_iter()
        .fold(Validation::Success(()), |acc, result| match (acc, result) {
            (Validation::Success(()), Validation::Success(())) => Validation::Success(()),
            (Validation::Failure(e), Validation::Success(())) => Validation::Failure(e),
            (Validation::Success(()), Validation::Failure(e)) => Validation::Failure(e),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
        })
}

pub(crate) enum Node {
    Scalar(ScalarNode),
    Collection(CollectionNode),
    Combinator(CombinatorNode),
    Plugin(Box<dyn PluginCheck>),
}

/// A compiled, immutable validator tree.
///
/// A schema exclusively owns its children. It is `Send + Sync`, and every
/// check is a pure read, so one schema can serve any number of concurrent
/// evaluations.
pub struct Schema {
    identifier: TypeIdentifier,
    node: Node,
}

impl Schema {
    pub(crate) fn new(identifier: TypeIdentifier, node: Node) -> Self {
        Self { identifier, node }
    }

    /// Re-labels the schema, keeping its node. Used for learned types.
    pub(crate) fn renamed(self, identifier: TypeIdentifier) -> Self {
        Self {
            identifier,
            node: self.node,
        }
    }

    /// Returns the canonical identifier of the type this node was built from.
    pub fn type_identifier(&self) -> &TypeIdentifier {
        &self.identifier
    }

    pub fn category(&self) -> Category {
        match self.node {
            Node::Scalar(_) => Category::Scalar,
            Node::Collection(_) => Category::Collection,
            Node::Combinator(_) => Category::Combinator,
            Node::Plugin(_) => Category::Plugin,
        }
    }

    /// Checks `value`, collecting every error (fail-soft mode).
    ///
    /// Never panics on any input. Errors carry paths relative to `value`.
    pub fn check(&self, value: &Value) -> CheckResult {
        self.check_at(value, &ValidationContext::root())
    }

    /// Checks `value` at an explicit position.
    ///
    /// This is the entry point plugins use to delegate to child schemas; the
    /// errors returned already carry full paths and should be passed on as is.
    pub fn check_at(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        match &self.node {
            Node::Scalar(node) => node.check(value, cx),
            Node::Collection(node) => node.check(value, cx),
            Node::Combinator(node) => node.check(value, cx),
            Node::Plugin(node) => node.check(value, cx),
        }
    }

    /// Returns the counting mode if this node is a combinator.
    pub fn mode(&self) -> Option<Mode> {
        match &self.node {
            Node::Combinator(node) => Some(node.mode()),
            _ => None,
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value).is_success()
    }

    /// Checks `value` and returns the first error on rejection (fail-fast mode).
    pub fn assert(&self, value: &Value) -> Result<(), ValidationError> {
        self.check(value)
            .into_result()
            .map_err(|errors| errors.first().clone())
    }

    /// Checks every value of a batch on the rayon pool.
    ///
    /// Results are returned in input order.
    pub fn check_many(&self, values: &[Value]) -> Vec<CheckResult> {
        trace!(identifier = %self.identifier, count = values.len(), "checking batch");
        values.par_iter().map(|value| self.check(value)).collect()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("identifier", &self.identifier)
            .field("category", &self.category())
            .finish_non_exhaustive()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};
