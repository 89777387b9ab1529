//! Type registry mapping canonical identifiers to constructors.
//!
//! This module provides the [`TypeRegistry`] the engine seals at
//! construction. It holds the core types, every plugin, and every learned
//! type, each with an optional compiled argument schema. After the engine is
//! built the registry is never mutated, so lookups need no locking.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::compiler::CompileContext;
use crate::error::{CompileError, ResolutionError};
use crate::resolver::TypeIdentifier;
use crate::schema::{
    ArrNode, CollectionNode, CombinatorNode, DynPlugin, MapNode, Mode, Node, RecNode, ScalarNode,
    Schema, SeqNode,
};

/// The built-in types living under the core base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CoreType {
    Any,
    All,
    One,
    Nil,
    Def,
    Fail,
    Bool,
    Num,
    Int,
    Str,
    Arr,
    Seq,
    Map,
    Rec,
}

impl CoreType {
    pub(crate) const ALL: [CoreType; 14] = [
        CoreType::Any,
        CoreType::All,
        CoreType::One,
        CoreType::Nil,
        CoreType::Def,
        CoreType::Fail,
        CoreType::Bool,
        CoreType::Num,
        CoreType::Int,
        CoreType::Str,
        CoreType::Arr,
        CoreType::Seq,
        CoreType::Map,
        CoreType::Rec,
    ];

    pub(crate) fn local_name(self) -> &'static str {
        match self {
            CoreType::Any => "any",
            CoreType::All => "all",
            CoreType::One => "one",
            CoreType::Nil => "nil",
            CoreType::Def => "def",
            CoreType::Fail => "fail",
            CoreType::Bool => "bool",
            CoreType::Num => "num",
            CoreType::Int => "int",
            CoreType::Str => "str",
            CoreType::Arr => "arr",
            CoreType::Seq => "seq",
            CoreType::Map => "map",
            CoreType::Rec => "rec",
        }
    }

    pub(crate) fn identifier(self) -> TypeIdentifier {
        TypeIdentifier::core(self.local_name())
    }

    /// The specification the arguments of a node of this type must satisfy.
    pub(crate) fn argument_spec(self) -> Value {
        let spec = schema_spec();
        let of = json!({ "type": "//arr", "contents": spec, "length": { "min": 1 } });
        let fields = json!({ "type": "//map", "values": spec });
        let length = range_spec(json!({ "type": "//int", "range": { "min": 0 } }));

        match self {
            CoreType::Any => rec(json!({}), json!({ "of": of })),
            CoreType::All | CoreType::One => rec(json!({ "of": of }), json!({})),
            CoreType::Nil | CoreType::Def | CoreType::Fail => rec(json!({}), json!({})),
            CoreType::Bool => rec(json!({}), json!({ "value": "//bool" })),
            CoreType::Num | CoreType::Int => {
                let item = if self == CoreType::Int { "//int" } else { "//num" };
                rec(
                    json!({}),
                    json!({
                        "range": range_spec(json!("//num")),
                        "value": item,
                        "values": { "type": "//arr", "contents": item },
                    }),
                )
            }
            CoreType::Str => rec(
                json!({}),
                json!({
                    "length": length,
                    "value": "//str",
                    "values": { "type": "//arr", "contents": "//str" },
                }),
            ),
            CoreType::Arr => rec(
                json!({ "contents": spec }),
                json!({ "length": length }),
            ),
            CoreType::Seq => rec(
                json!({ "contents": { "type": "//arr", "contents": spec } }),
                json!({ "tail": spec }),
            ),
            CoreType::Map => rec(json!({ "values": spec }), json!({})),
            CoreType::Rec => rec(
                json!({}),
                json!({
                    "required": fields,
                    "optional": fields,
                    "rest": spec,
                    "strict": "//bool",
                }),
            ),
        }
    }

    pub(crate) fn build(
        self,
        node: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Node, CompileError> {
        Ok(match self {
            CoreType::Any if node.contains_key("of") => {
                Node::Combinator(CombinatorNode::build(Mode::Any, node, ctx)?)
            }
            CoreType::Any => Node::Scalar(ScalarNode::Any),
            CoreType::All => Node::Combinator(CombinatorNode::build(Mode::All, node, ctx)?),
            CoreType::One => Node::Combinator(CombinatorNode::build(Mode::One, node, ctx)?),
            CoreType::Nil => Node::Scalar(ScalarNode::Nil),
            CoreType::Def => Node::Scalar(ScalarNode::Def),
            CoreType::Fail => Node::Scalar(ScalarNode::Fail),
            CoreType::Bool => Node::Scalar(ScalarNode::bool(node, ctx)?),
            CoreType::Num => Node::Scalar(ScalarNode::num(false, node, ctx)?),
            CoreType::Int => Node::Scalar(ScalarNode::num(true, node, ctx)?),
            CoreType::Str => Node::Scalar(ScalarNode::str(node, ctx)?),
            CoreType::Arr => Node::Collection(CollectionNode::Arr(ArrNode::build(node, ctx)?)),
            CoreType::Seq => Node::Collection(CollectionNode::Seq(SeqNode::build(node, ctx)?)),
            CoreType::Map => Node::Collection(CollectionNode::Map(MapNode::build(node, ctx)?)),
            CoreType::Rec => Node::Collection(CollectionNode::Rec(RecNode::build(node, ctx)?)),
        })
    }
}

/// A schema specification: a type name, or a mapping with a string `type`.
fn schema_spec() -> Value {
    json!({
        "type": "//any",
        "of": [
            "//str",
            { "type": "//rec", "required": { "type": "//str" }, "strict": false },
        ],
    })
}

fn range_spec(bound: Value) -> Value {
    json!({
        "type": "//rec",
        "optional": { "min": bound, "max": bound, "min-ex": bound, "max-ex": bound },
    })
}

fn rec(required: Value, optional: Value) -> Value {
    json!({ "type": "//rec", "required": required, "optional": optional })
}

/// How a registered type is constructed.
pub(crate) enum Constructor {
    Core(CoreType),
    Plugin(Arc<dyn DynPlugin>),
    /// A type defined by a specification, compiled at each point of use.
    Learned(Value),
}

pub(crate) struct Entry {
    constructor: Constructor,
    arguments: Option<Schema>,
}

impl Entry {
    pub(crate) fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub(crate) fn arguments(&self) -> Option<&Schema> {
        self.arguments.as_ref()
    }
}

/// Registered types, keyed by canonical identifier in registration order.
pub(crate) struct TypeRegistry {
    entries: IndexMap<TypeIdentifier, Entry>,
}

impl TypeRegistry {
    /// Creates a registry holding the core types, without argument schemas.
    pub(crate) fn core() -> Self {
        let entries = CoreType::ALL
            .iter()
            .map(|core| {
                (
                    core.identifier(),
                    Entry {
                        constructor: Constructor::Core(*core),
                        arguments: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Registers a plugin or learned type.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ReservedIdentifier` for identifiers under the
    /// core base and `RegistryError::DuplicateType` for identifiers already
    /// registered.
    pub(crate) fn register(
        &mut self,
        identifier: TypeIdentifier,
        constructor: Constructor,
    ) -> Result<(), RegistryError> {
        if identifier.is_core() {
            return Err(RegistryError::ReservedIdentifier(identifier));
        }
        if self.entries.contains_key(&identifier) {
            return Err(RegistryError::DuplicateType(identifier));
        }
        self.entries.insert(
            identifier,
            Entry {
                constructor,
                arguments: None,
            },
        );
        Ok(())
    }

    pub(crate) fn set_arguments(&mut self, identifier: &TypeIdentifier, schema: Schema) {
        if let Some(entry) = self.entries.get_mut(identifier) {
            entry.arguments = Some(schema);
        }
    }

    pub(crate) fn lookup(&self, identifier: &TypeIdentifier) -> Option<&Entry> {
        self.entries.get(identifier)
    }

    pub(crate) fn contains(&self, identifier: &TypeIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub(crate) fn identifiers(&self) -> impl Iterator<Item = &TypeIdentifier> {
        self.entries.keys()
    }

    /// Iterates over registered types and their constructors.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&TypeIdentifier, &Constructor)> {
        self.entries.iter().map(|(id, entry)| (id, &entry.constructor))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Errors that can occur while assembling the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A type with the same identifier is already registered.
    #[error("type '{0}' already registered")]
    DuplicateType(TypeIdentifier),

    /// A prefix with the same name is already registered.
    #[error("prefix '{0}' already registered")]
    DuplicatePrefix(String),

    /// Only built-in types may live under the core base.
    #[error("identifier '{0}' is reserved for core types")]
    ReservedIdentifier(TypeIdentifier),

    #[error("invalid type identifier '{name}': {source}")]
    InvalidIdentifier {
        name: String,
        #[source]
        source: ResolutionError,
    },
}
