//! Specification → schema compilation.
//!
//! [`CompileContext`] carries everything one compilation step needs: the
//! sealed engine (registry, prefixes, options), the location inside the
//! specification tree, and the nesting depth. Constructors, built-in or
//! plugin, receive a context and call back into it to compile nested
//! fragments.
//!
//! Compiling one node:
//! 1. resolve its `type` name to a canonical identifier,
//! 2. look the identifier up in the registry,
//! 3. check the node's arguments against the type's argument schema,
//! 4. run the constructor, which compiles children through the context,
//! 5. package the result as an immutable [`Schema`].
//!
//! Any failure aborts the whole compilation.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::engine::{Engine, DEFAULT_MAX_DEPTH};
use crate::error::{CompileError, ErrorKind, ValidationError, ValidationErrors};
use crate::path::Path;
use crate::registry::Constructor;
use crate::resolver::TypeIdentifier;
use crate::schema::{Node, Range, Schema};
use crate::validation::{type_name, ValidationContext};

/// Compilation state for one specification node.
pub struct CompileContext<'e> {
    engine: &'e Engine,
    location: Path,
    depth: usize,
    trusted: bool,
    identifier: Option<TypeIdentifier>,
}

impl<'e> CompileContext<'e> {
    /// Creates the context for a root specification.
    ///
    /// A trusted context skips argument checking; the engine uses it only for
    /// its own argument schemas.
    pub(crate) fn root(engine: &'e Engine, trusted: bool) -> Self {
        Self {
            engine,
            location: Path::root(),
            depth: 0,
            trusted,
            identifier: None,
        }
    }

    /// Compiles a nested specification located at the current node.
    pub fn compile(&self, spec: &Value) -> Result<Schema, CompileError> {
        self.child(&Path::root()).compile_node(spec)
    }

    /// Compiles the specification found under argument `key` of the current node.
    pub fn compile_in(&self, key: &str, spec: &Value) -> Result<Schema, CompileError> {
        self.child(&Path::root().push_key(key)).compile_node(spec)
    }

    /// Compiles a specification located at `tail` below the current node.
    pub fn compile_at(&self, tail: &Path, spec: &Value) -> Result<Schema, CompileError> {
        self.child(tail).compile_node(spec)
    }

    /// Returns the location of the current node inside the root specification.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the identifier of the type being constructed, if resolved.
    pub fn identifier(&self) -> Option<&TypeIdentifier> {
        self.identifier.as_ref()
    }

    /// Whether mapping keys keep their declaration order in diagnostics.
    pub fn key_ordering(&self) -> bool {
        self.engine.key_ordering()
    }

    /// Builds an argument error located at `tail` below the current node.
    pub fn argument_error(
        &self,
        tail: &Path,
        kind: ErrorKind,
        message: impl Into<String>,
        value: &Value,
    ) -> ValidationError {
        ValidationError::new(kind, message, value.clone()).at(self.location.join(tail))
    }

    /// Wraps argument errors into a compile error for the current type.
    pub fn reject(&self, errors: Vec<ValidationError>) -> CompileError {
        match (self.identifier.clone(), ValidationErrors::from_vec(errors)) {
            (Some(identifier), Some(errors)) => CompileError::InvalidArgument { identifier, errors },
            (None, Some(errors)) => self.malformed(errors.first().message.clone()),
            (_, None) => self.malformed("arguments rejected"),
        }
    }

    /// Shorthand for rejecting a single argument value.
    pub fn invalid_argument(&self, key: &str, message: impl Into<String>, value: &Value) -> CompileError {
        self.reject(vec![self.argument_error(
            &Path::root().push_key(key),
            ErrorKind::Value,
            message,
            value,
        )])
    }

    /// Returns argument `key`, or an `InvalidArgument` error if it is absent.
    pub fn required<'a>(
        &self,
        node: &'a Map<String, Value>,
        key: &str,
    ) -> Result<&'a Value, CompileError> {
        node.get(key).ok_or_else(|| {
            self.reject(vec![self.argument_error(
                &Path::root().push_key(key),
                ErrorKind::Missing,
                format!("missing required argument '{}'", key),
                &Value::Object(node.clone()),
            )])
        })
    }

    pub(crate) fn list_argument<'a>(
        &self,
        node: &'a Map<String, Value>,
        key: &str,
    ) -> Result<&'a Vec<Value>, CompileError> {
        let value = self.required(node, key)?;
        value
            .as_array()
            .ok_or_else(|| self.invalid_argument(key, format!("'{}' must be a list", key), value))
    }

    pub(crate) fn mapping_argument<'a>(
        &self,
        node: &'a Map<String, Value>,
        key: &str,
    ) -> Result<Option<&'a Map<String, Value>>, CompileError> {
        match node.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.invalid_argument(
                key,
                format!("'{}' must be a mapping", key),
                other,
            )),
        }
    }

    pub(crate) fn range_argument(
        &self,
        node: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<Range>, CompileError> {
        let Some(spec) = node.get(key) else {
            return Ok(None);
        };
        Range::from_spec(spec).map(Some).map_err(|(bound, message)| {
            let mut tail = Path::root().push_key(key);
            if !bound.is_empty() {
                tail = tail.push_key(bound);
            }
            self.reject(vec![self.argument_error(&tail, ErrorKind::Value, message, spec)])
        })
    }

    fn child(&self, tail: &Path) -> Self {
        Self {
            engine: self.engine,
            location: self.location.join(tail),
            depth: self.depth + 1,
            trusted: self.trusted,
            identifier: None,
        }
    }

    fn for_type(&self, identifier: TypeIdentifier) -> Self {
        Self {
            engine: self.engine,
            location: self.location.clone(),
            depth: self.depth,
            trusted: self.trusted,
            identifier: Some(identifier),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> CompileError {
        CompileError::MalformedNode {
            at: self.location.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn compile_node(&self, spec: &Value) -> Result<Schema, CompileError> {
        // Built-in argument schemas are not bound by the configured limit.
        let max_depth = if self.trusted {
            DEFAULT_MAX_DEPTH
        } else {
            self.engine.max_depth()
        };
        if self.depth > max_depth {
            return Err(CompileError::DepthExceeded {
                max_depth,
                at: self.location.clone(),
            });
        }

        let shorthand;
        let node = match spec {
            Value::Object(node) => node,
            Value::String(name) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(name.clone()));
                shorthand = map;
                &shorthand
            }
            other => {
                return Err(self.malformed(format!(
                    "expected a type name or a mapping, found {}",
                    type_name(other)
                )))
            }
        };

        let name = match node.get("type") {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(self.malformed(format!(
                    "'type' must be a string, found {}",
                    type_name(other)
                )))
            }
            None => return Err(self.malformed("missing 'type'")),
        };

        let identifier = self
            .engine
            .resolve(name)
            .map_err(|source| CompileError::Resolution {
                source,
                at: self.location.push_key("type"),
            })?;

        let entry = self
            .engine
            .registry()
            .lookup(&identifier)
            .ok_or_else(|| CompileError::UnknownType {
                identifier: identifier.clone(),
                at: self.location.clone(),
            })?;

        trace!(identifier = %identifier, depth = self.depth, at = %self.location, "compiling node");

        if !self.trusted {
            if let Some(arguments) = entry.arguments() {
                self.check_arguments(&identifier, arguments, node)?;
            }
        }

        let here = self.for_type(identifier.clone());
        let schema = match entry.constructor() {
            Constructor::Core(core) => Schema::new(identifier, core.build(node, &here)?),
            Constructor::Plugin(plugin) => {
                let check = Arc::clone(plugin).build(node, &here)?;
                Schema::new(identifier, Node::Plugin(check))
            }
            Constructor::Learned(definition) => here.compile(definition)?.renamed(identifier),
        };
        Ok(schema)
    }

    /// Evaluates the node's arguments (everything except `type`) against the
    /// type's own argument schema.
    fn check_arguments(
        &self,
        identifier: &TypeIdentifier,
        arguments: &Schema,
        node: &Map<String, Value>,
    ) -> Result<(), CompileError> {
        let args: Map<String, Value> = node
            .iter()
            .filter(|(key, _)| key.as_str() != "type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        arguments
            .check_at(&Value::Object(args), &ValidationContext::at(self.location.clone()))
            .into_result()
            .map_err(|errors| CompileError::InvalidArgument {
                identifier: identifier.clone(),
                errors,
            })
    }
}
