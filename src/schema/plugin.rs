//! The plugin interface for externally defined types.
//!
//! This module provides the [`TypePlugin`] trait that third-party types
//! implement, and the type-erased traits the registry and the compiled tree
//! store them behind.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::compiler::CompileContext;
use crate::error::CompileError;
use crate::validation::ValidationContext;
use crate::CheckResult;

/// A type supplied from outside the engine.
///
/// A plugin is registered once, through
/// [`EngineConfig::with_plugin`](crate::EngineConfig::with_plugin), and is
/// immutable afterwards. Compiling a node of its type calls
/// [`build_state`](TypePlugin::build_state) once; every check then calls
/// [`evaluate`](TypePlugin::evaluate) with that state.
///
/// The state may hold child [`Schema`](crate::Schema)s compiled through the
/// context. Delegating to them with [`Schema::check_at`](crate::Schema::check_at)
/// under a derived [`ValidationContext`] yields errors with full paths, and
/// those errors should be returned unchanged.
///
/// # Example
///
/// ```rust
/// use rxschema::{
///     CheckResult, CompileContext, CompileError, Engine, EngineConfig, ErrorKind,
///     TypePlugin, ValidationContext,
/// };
/// use serde_json::{json, Map, Value};
/// use stillwater::Validation;
///
/// struct Even;
///
/// impl TypePlugin for Even {
///     type State = ();
///
///     fn type_identifier(&self) -> &str {
///         "tag:example.com,EXAMPLE:rx/even"
///     }
///
///     fn build_state(&self, _: &Map<String, Value>, _: &CompileContext<'_>) -> Result<(), CompileError> {
///         Ok(())
///     }
///
///     fn evaluate(&self, _: &(), value: &Value, cx: &ValidationContext) -> CheckResult {
///         match value.as_i64() {
///             Some(n) if n % 2 == 0 => Validation::Success(()),
///             Some(_) => cx.fail(ErrorKind::Value, "expected an even number", value),
///             None => cx.type_mismatch("int", value),
///         }
///     }
/// }
///
/// let engine = Engine::new(EngineConfig::new().with_plugin(Even)).unwrap();
/// let schema = engine.compile(&json!("tag:example.com,EXAMPLE:rx/even")).unwrap();
/// assert!(schema.is_valid(&json!(4)));
/// assert!(!schema.is_valid(&json!(3)));
/// ```
pub trait TypePlugin: Send + Sync + 'static {
    /// Compiled per-node state, read-only during evaluation.
    type State: Send + Sync + 'static;

    /// The type's identifier, canonical or in prefix shorthand.
    fn type_identifier(&self) -> &str;

    /// An optional specification every node's arguments must satisfy before
    /// [`build_state`](TypePlugin::build_state) runs. The `type` key is
    /// removed from the node before the check.
    fn argument_schema(&self) -> Option<Value> {
        None
    }

    /// Builds the state for one node.
    fn build_state(
        &self,
        spec: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Self::State, CompileError>;

    /// Checks a value. Must be a pure function of `state` and `value`.
    fn evaluate(&self, state: &Self::State, value: &Value, cx: &ValidationContext) -> CheckResult;
}

/// Object-safe view of a [`TypePlugin`] as stored by the registry.
pub(crate) trait DynPlugin: Send + Sync {
    fn type_identifier(&self) -> &str;

    fn argument_schema(&self) -> Option<Value>;

    fn build(
        self: Arc<Self>,
        spec: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Box<dyn PluginCheck>, CompileError>;
}

impl<P: TypePlugin> DynPlugin for P {
    fn type_identifier(&self) -> &str {
        TypePlugin::type_identifier(self)
    }

    fn argument_schema(&self) -> Option<Value> {
        TypePlugin::argument_schema(self)
    }

    fn build(
        self: Arc<Self>,
        spec: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Box<dyn PluginCheck>, CompileError> {
        let state = self.build_state(spec, ctx)?;
        Ok(Box::new(Compiled {
            plugin: self,
            state,
        }))
    }
}

/// A compiled plugin node: the plugin paired with its per-node state.
pub(crate) trait PluginCheck: Send + Sync {
    fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult;
}

struct Compiled<P: TypePlugin> {
    plugin: Arc<P>,
    state: P::State,
}

impl<P: TypePlugin> PluginCheck for Compiled<P> {
    fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        self.plugin.evaluate(&self.state, value, cx)
    }
}
