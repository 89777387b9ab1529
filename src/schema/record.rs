//! Keyed collections: uniform maps and records.
//!
//! Records declare required and optional fields. What happens to keys the
//! record does not declare is fixed at compile time by [`Unknown`]: they are
//! rejected (strict, the default), ignored (permissive), or gathered into one
//! mapping and checked against a `rest` schema.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{combine_all, Schema};
use crate::compiler::CompileContext;
use crate::error::{CompileError, ErrorKind};
use crate::path::Path;
use crate::validation::ValidationContext;
use crate::CheckResult;

/// `//map`: every value matches one schema, keys are free.
pub(crate) struct MapNode {
    values: Box<Schema>,
    sorted: bool,
}

impl MapNode {
    pub(crate) fn build(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let values = ctx.compile_in("values", ctx.required(node, "values")?)?;
        Ok(Self {
            values: Box::new(values),
            sorted: !ctx.key_ordering(),
        })
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        let Some(map) = value.as_object() else {
            return cx.type_mismatch("map", value);
        };

        let values_cx = cx.within("values");
        let results = entries(map, self.sorted)
            .into_iter()
            .map(|(key, item)| self.values.check_at(item, &values_cx.field(key)))
            .collect::<Vec<_>>();
        combine_all(results)
    }
}

/// Treatment of keys a record does not declare.
pub(crate) enum Unknown {
    Reject,
    Ignore,
    Check(Box<Schema>),
}

/// `//rec`: declared fields with a fixed policy for the rest.
pub(crate) struct RecNode {
    required: IndexMap<String, Schema>,
    optional: IndexMap<String, Schema>,
    unknown: Unknown,
    sorted: bool,
}

impl RecNode {
    pub(crate) fn build(node: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Self, CompileError> {
        let mut required = compile_fields(node, "required", ctx)?;
        let mut optional = compile_fields(node, "optional", ctx)?;

        let overlap: Vec<_> = required
            .keys()
            .filter(|key| optional.contains_key(*key))
            .map(|key| {
                ctx.argument_error(
                    &Path::root().push_key("optional").push_key(key.as_str()),
                    ErrorKind::Value,
                    format!("field '{}' is declared both required and optional", key),
                    &Value::String(key.clone()),
                )
            })
            .collect();
        if !overlap.is_empty() {
            return Err(ctx.reject(overlap));
        }

        let strict = match node.get("strict") {
            None => true,
            Some(Value::Bool(strict)) => *strict,
            Some(other) => return Err(ctx.invalid_argument("strict", "'strict' must be a bool", other)),
        };

        let unknown = match (node.get("rest"), strict) {
            (Some(_), false) => {
                return Err(ctx.invalid_argument(
                    "strict",
                    "'rest' cannot be combined with 'strict: false'",
                    &Value::Bool(false),
                ))
            }
            (Some(rest), true) => Unknown::Check(Box::new(ctx.compile_in("rest", rest)?)),
            (None, true) => Unknown::Reject,
            (None, false) => Unknown::Ignore,
        };

        let sorted = !ctx.key_ordering();
        if sorted {
            required.sort_keys();
            optional.sort_keys();
        }

        Ok(Self {
            required,
            optional,
            unknown,
            sorted,
        })
    }

    pub(crate) fn check(&self, value: &Value, cx: &ValidationContext) -> CheckResult {
        let Some(map) = value.as_object() else {
            return cx.type_mismatch("map", value);
        };

        let mut results = Vec::new();

        for (key, schema) in &self.required {
            let field_cx = cx.field(key.as_str()).within("required").within(key.as_str());
            match map.get(key) {
                Some(item) => results.push(schema.check_at(item, &field_cx)),
                None => results.push(
                    field_cx
                        .fail(
                            ErrorKind::Missing,
                            format!("missing required field '{}'", key),
                            value,
                        ),
                ),
            }
        }

        for (key, schema) in &self.optional {
            if let Some(item) = map.get(key) {
                let field_cx = cx.field(key.as_str()).within("optional").within(key.as_str());
                results.push(schema.check_at(item, &field_cx));
            }
        }

        let unknown: Vec<(&String, &Value)> = entries(map, self.sorted)
            .into_iter()
            .filter(|(key, _)| !self.required.contains_key(*key) && !self.optional.contains_key(*key))
            .collect();

        match &self.unknown {
            Unknown::Ignore => {}
            Unknown::Reject => results.extend(unknown.into_iter().map(|(key, item)| {
                cx.field(key.as_str()).fail(
                    ErrorKind::Unexpected,
                    format!("unexpected field '{}'", key),
                    item,
                )
            })),
            Unknown::Check(rest) => {
                let leftover: Map<String, Value> = unknown
                    .into_iter()
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect();
                results.push(rest.check_at(&Value::Object(leftover), &cx.within("rest")));
            }
        }

        combine_all(results)
    }
}

fn compile_fields(
    node: &Map<String, Value>,
    key: &str,
    ctx: &CompileContext<'_>,
) -> Result<IndexMap<String, Schema>, CompileError> {
    let Some(fields) = ctx.mapping_argument(node, key)? else {
        return Ok(IndexMap::new());
    };
    fields
        .iter()
        .map(|(name, spec)| {
            let at = Path::root().push_key(key).push_key(name.as_str());
            ctx.compile_at(&at, spec).map(|schema| (name.clone(), schema))
        })
        .collect()
}

fn entries(map: &Map<String, Value>, sorted: bool) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    if sorted {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }
    entries
}
