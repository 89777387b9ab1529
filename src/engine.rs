//! The engine: configuration, sealing, and the `compile` entry point.
//!
//! An [`Engine`] is assembled once from an [`EngineConfig`]: prefixes are
//! added to the default table, plugins and learned types are resolved and
//! registered next to the core types, and every type's argument schema is
//! compiled. From then on the engine is immutable and can be shared freely
//! across threads.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::compiler::CompileContext;
use crate::error::{CompileError, ResolutionError};
use crate::registry::{Constructor, RegistryError, TypeRegistry};
use crate::resolver::{resolve, PrefixTable, TypeIdentifier};
use crate::schema::{DynPlugin, Schema, TypePlugin};

/// Default maximum nesting depth of a specification.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Everything an engine is built from.
///
/// # Example
///
/// ```rust
/// use rxschema::{Engine, EngineConfig};
/// use serde_json::json;
///
/// let engine = Engine::new(
///     EngineConfig::new()
///         .with_prefix("example", "tag:example.com,EXAMPLE:rx/")
///         .with_type("/example/status", json!({ "type": "//str", "values": ["open", "closed"] }))
///         .with_max_depth(32),
/// )
/// .unwrap();
///
/// let schema = engine.compile(&json!("/example/status")).unwrap();
/// assert!(schema.is_valid(&json!("open")));
/// ```
#[derive(Clone)]
pub struct EngineConfig {
    prefixes: Vec<(String, String)>,
    plugins: Vec<Arc<dyn DynPlugin>>,
    types: Vec<(String, Value)>,
    key_ordering: bool,
    max_depth: usize,
}

impl EngineConfig {
    /// Creates a configuration with no extra prefixes, plugins or types.
    pub fn new() -> Self {
        Self {
            prefixes: Vec::new(),
            plugins: Vec::new(),
            types: Vec::new(),
            key_ordering: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Adds a prefix mapping a short name to a canonical base.
    ///
    /// Prefixes never override: a name that is already present (including
    /// the reserved empty name and `.meta`) makes [`Engine::new`] fail.
    pub fn with_prefix(mut self, name: impl Into<String>, base: impl Into<String>) -> Self {
        self.prefixes.push((name.into(), base.into()));
        self
    }

    /// Registers a plugin type.
    pub fn with_plugin<P: TypePlugin>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Registers a learned type: a name standing for a specification.
    ///
    /// `name` may use any prefix added to this configuration.
    pub fn with_type(mut self, name: impl Into<String>, spec: Value) -> Self {
        self.types.push((name.into(), spec));
        self
    }

    /// Sets whether mapping keys are reported in declaration order (the
    /// default) or sorted.
    pub fn with_key_ordering(mut self, key_ordering: bool) -> Self {
        self.key_ordering = key_ordering;
        self
    }

    /// Sets the maximum specification nesting depth.
    ///
    /// The default max depth is 100. Deeper specifications, including
    /// learned types that refer to themselves unconditionally, fail to
    /// compile with `CompileError::DepthExceeded`. The limit also applies to
    /// plugin argument schemas but not to the built-in ones.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.type_identifier()).collect();
        f.debug_struct("EngineConfig")
            .field("prefixes", &self.prefixes)
            .field("plugins", &plugins)
            .field("types", &self.types)
            .field("key_ordering", &self.key_ordering)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Errors raised while building an engine.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A type's argument schema did not compile.
    #[error("argument schema of '{identifier}' does not compile: {source}")]
    ArgumentSchema {
        identifier: TypeIdentifier,
        #[source]
        source: Box<CompileError>,
    },
}

/// A sealed compilation engine.
///
/// # Example
///
/// ```rust
/// use rxschema::Engine;
/// use serde_json::json;
///
/// let engine = Engine::default();
/// let schema = engine
///     .compile(&json!({
///         "type": "//rec",
///         "required": { "name": "//str" },
///         "optional": { "age": { "type": "//int", "range": { "min": 0 } } },
///     }))
///     .unwrap();
///
/// assert!(schema.is_valid(&json!({ "name": "Ada", "age": 36 })));
/// assert!(!schema.is_valid(&json!({ "name": "Ada", "email": "ada@example.com" })));
/// ```
pub struct Engine {
    registry: TypeRegistry,
    prefixes: PrefixTable,
    key_ordering: bool,
    max_depth: usize,
}

impl Engine {
    /// Validates and seals a configuration.
    ///
    /// # Errors
    ///
    /// - `RegistryError::DuplicatePrefix` if a prefix name is already taken
    /// - `RegistryError::InvalidIdentifier` if a plugin or learned type name
    ///   does not resolve
    /// - `RegistryError::ReservedIdentifier` for names under the core base
    /// - `RegistryError::DuplicateType` if two types share an identifier
    /// - `ConfigError::ArgumentSchema` if a plugin's argument schema does not
    ///   compile
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let EngineConfig {
            prefixes: extra_prefixes,
            plugins,
            types,
            key_ordering,
            max_depth,
        } = config;

        let mut prefixes = PrefixTable::new();
        for (name, base) in extra_prefixes {
            if !prefixes.insert(name.clone(), base) {
                return Err(RegistryError::DuplicatePrefix(name).into());
            }
        }

        let mut registry = TypeRegistry::core();
        for plugin in plugins {
            let identifier = identifier_for(plugin.type_identifier(), &prefixes)?;
            registry.register(identifier, Constructor::Plugin(plugin))?;
        }
        for (name, spec) in types {
            let identifier = identifier_for(&name, &prefixes)?;
            registry.register(identifier, Constructor::Learned(spec))?;
        }

        let mut engine = Engine {
            registry,
            prefixes,
            key_ordering,
            max_depth,
        };

        // Built-in argument schemas are compiled unchecked; they are what
        // checking would use. Plugin argument schemas get the full treatment.
        let mut trusted = Vec::new();
        let mut untrusted = Vec::new();
        for (identifier, constructor) in engine.registry.iter() {
            match constructor {
                Constructor::Core(core) => trusted.push((identifier.clone(), core.argument_spec())),
                Constructor::Learned(_) => {
                    trusted.push((identifier.clone(), json!({ "type": "//rec" })))
                }
                Constructor::Plugin(plugin) => {
                    if let Some(spec) = plugin.argument_schema() {
                        untrusted.push((identifier.clone(), spec));
                    }
                }
            }
        }

        for (specs, is_trusted) in [(trusted, true), (untrusted, false)] {
            let compiled = engine.compile_arguments(specs, is_trusted)?;
            for (identifier, schema) in compiled {
                engine.registry.set_arguments(&identifier, schema);
            }
        }

        debug!(
            types = engine.registry.len(),
            prefixes = engine.prefixes.len(),
            max_depth = engine.max_depth,
            "engine sealed"
        );
        Ok(engine)
    }

    fn compile_arguments(
        &self,
        specs: Vec<(TypeIdentifier, Value)>,
        trusted: bool,
    ) -> Result<Vec<(TypeIdentifier, Schema)>, ConfigError> {
        specs
            .into_iter()
            .map(|(identifier, spec)| {
                match CompileContext::root(self, trusted).compile_node(&spec) {
                    Ok(schema) => Ok((identifier, schema)),
                    Err(source) => Err(ConfigError::ArgumentSchema {
                        identifier,
                        source: Box::new(source),
                    }),
                }
            })
            .collect()
    }

    /// Compiles a specification into an immutable [`Schema`].
    ///
    /// `spec` is a type name (`"//str"`) or a mapping with a `type` field and
    /// the type's arguments.
    ///
    /// # Errors
    ///
    /// Any failure anywhere in the specification tree aborts compilation;
    /// see [`CompileError`] for the cases.
    pub fn compile(&self, spec: &Value) -> Result<Schema, CompileError> {
        CompileContext::root(self, false)
            .compile_node(spec)
            .inspect_err(|err| debug!(error = %err, at = %err.location(), "compile failed"))
    }

    /// Expands a type name against this engine's prefixes.
    pub fn resolve(&self, name: &str) -> Result<TypeIdentifier, ResolutionError> {
        resolve(name, &self.prefixes)
    }

    /// Returns true if a type with this identifier is registered.
    pub fn knows_type(&self, identifier: &TypeIdentifier) -> bool {
        self.registry.contains(identifier)
    }

    /// Iterates over registered identifiers: core types first, then plugins
    /// and learned types in configuration order.
    pub fn type_identifiers(&self) -> impl Iterator<Item = &TypeIdentifier> {
        self.registry.identifiers()
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    pub fn key_ordering(&self) -> bool {
        self.key_ordering
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

impl Default for Engine {
    /// An engine with the core types and default prefixes only.
    fn default() -> Self {
        Engine::new(EngineConfig::new()).expect("core argument schemas compile")
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.registry.len())
            .field("prefixes", &self.prefixes)
            .field("key_ordering", &self.key_ordering)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

fn identifier_for(name: &str, prefixes: &PrefixTable) -> Result<TypeIdentifier, RegistryError> {
    resolve(name, prefixes).map_err(|source| RegistryError::InvalidIdentifier {
        name: name.to_string(),
        source,
    })
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Engine>();
    assert_sync::<Engine>();
};
