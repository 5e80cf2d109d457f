//! Bridges the walker and the hook chain to the serde decode engine.
//!
//! The walker's raw tree and the schema are traversed in lockstep: every
//! leaf literal is converted through the chain towards its registered
//! target kind, producing a [`serde_json::Value`] tree the decode engine
//! understands. [`fill_defaults`] then overlays that tree onto a
//! destination's serialized form, writing only where the destination holds
//! nothing yet.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ConvertError, LeafError, LeafResult};
use crate::hooks::{Conversion, HookChain};
use crate::schema::{FieldKind, Schema, TargetKind};
use crate::value::RawValue;
use crate::walker;

/// Derive the typed default tree for `schema`, or `None` when the schema
/// registers no defaults.
///
/// # Errors
///
/// Returns [`LeafError::Default`] when a literal cannot be converted for
/// its field, and [`LeafError::UnknownKey`] when a tree key resolves to no
/// schema field.
pub fn typed_defaults(schema: &Schema, chain: &HookChain) -> LeafResult<Option<Value>> {
    match walker::default_tree(schema) {
        None => Ok(None),
        Some(RawValue::Map(tree)) => convert_map(schema, &tree, chain, "").map(Some),
        // The walker only ever produces a map at the top level.
        Some(_) => Ok(None),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn convert_map(
    schema: &Schema,
    tree: &BTreeMap<String, RawValue>,
    chain: &HookChain,
    prefix: &str,
) -> LeafResult<Value> {
    let mut out = serde_json::Map::new();
    for (key, raw) in tree {
        let path = join(prefix, key);
        let spec = schema
            .resolve(key)
            .ok_or_else(|| LeafError::UnknownKey { key: path.clone() })?;
        let value = match (spec.kind(), raw) {
            (FieldKind::Nested(sub), RawValue::Map(nested)) => {
                convert_map(sub, nested, chain, &path)?
            }
            // A literal registered on a nested field flows to the decoder
            // verbatim; the decode phase rejects it if the destination
            // cannot absorb a string there.
            (FieldKind::Nested(_), RawValue::Text(s)) => Value::String(s.clone()),
            (FieldKind::Nested(_), RawValue::Seq(_)) => {
                return Err(LeafError::Default {
                    field: path,
                    source: ConvertError::unhandled("<sequence>", "nested schema"),
                });
            }
            (FieldKind::Leaf(kind), raw) => convert_leaf(raw, kind, chain, &path)?,
        };
        out.insert(key.clone(), value);
    }
    Ok(Value::Object(out))
}

fn convert_leaf(
    raw: &RawValue,
    kind: &TargetKind,
    chain: &HookChain,
    path: &str,
) -> LeafResult<Value> {
    let outcome = chain.convert(raw, kind).map_err(|source| LeafError::Default {
        field: path.to_owned(),
        source,
    })?;
    match outcome {
        Conversion::Converted(decoded) => Ok(serde_json::to_value(&decoded)?),
        Conversion::Unhandled => match (raw, kind) {
            // Text to text needs no hook.
            (RawValue::Text(s), TargetKind::Text) => Ok(Value::String(s.clone())),
            (RawValue::Text(s), _) => Err(LeafError::Default {
                field: path.to_owned(),
                source: ConvertError::unhandled(s.clone(), kind),
            }),
            _ => Err(LeafError::Default {
                field: path.to_owned(),
                source: ConvertError::unhandled("<non-literal value>", kind),
            }),
        },
    }
}

/// Overlay `defaults` onto `current`, writing only where `current` is
/// missing a key or holds the zero value of its shape.
///
/// Fields already populated by a higher-precedence source are never
/// altered, which also makes re-application a no-op.
pub fn fill_defaults(current: &mut Value, defaults: &Value) {
    match (current, defaults) {
        (Value::Object(cur), Value::Object(defs)) => {
            for (key, default) in defs {
                match cur.get_mut(key) {
                    None => {
                        cur.insert(key.clone(), default.clone());
                    }
                    Some(existing) => {
                        if existing.is_object() && default.is_object() {
                            fill_defaults(existing, default);
                        } else if is_zero(existing) {
                            *existing = default.clone();
                        }
                    }
                }
            }
        }
        (cur, defs) => {
            if is_zero(cur) {
                *cur = defs.clone();
            }
        }
    }
}

/// Whether a serialized value is the zero value of its shape.
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Number(n) => {
            n.as_i64() == Some(0) || n.as_u64() == Some(0) || n.as_f64() == Some(0.0)
        }
        // Covers the empty string and a char field's zero value, which
        // serializes as a NUL-only string.
        Value::String(s) => s.chars().all(|c| c == '\0'),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_zero),
    }
}
