//! Recursive derivation of the default-value tree from a schema.

use std::collections::BTreeMap;

use crate::schema::{Entry, FieldKind, Schema};
use crate::value::RawValue;

/// Walk `schema` and collect registered default literals into a tree.
///
/// Entries are visited in declaration order. A nested field contributes the
/// tree derived from its sub-schema; a default literal registered on the
/// same field replaces that tree. Flattened schemas merge into the parent
/// namespace first, so explicit registrations win on key collision.
///
/// Returns `None` when no entry yields a default.
#[must_use]
pub fn default_tree(schema: &Schema) -> Option<RawValue> {
    let mut path = Vec::new();
    walk(schema, &mut path)
}

fn walk(schema: &Schema, path: &mut Vec<*const Schema>) -> Option<RawValue> {
    // Shared sub-schemas may appear at several sibling positions; only a
    // revisit on the current traversal path is a cycle, and it truncates.
    let ptr = std::ptr::from_ref(schema);
    if path.contains(&ptr) {
        return None;
    }
    path.push(ptr);

    let mut out = BTreeMap::new();
    for entry in schema.entries() {
        if let Entry::Flatten(sub) = entry
            && let Some(RawValue::Map(merged)) = walk(sub, path)
        {
            out.extend(merged);
        }
    }
    for entry in schema.entries() {
        let Entry::Field(spec) = entry else { continue };
        if let FieldKind::Nested(sub) = spec.kind()
            && let Some(tree) = walk(sub, path)
        {
            out.insert(spec.key().to_owned(), tree);
        }
        if let Some(literal) = spec.default_literal() {
            out.insert(spec.key().to_owned(), RawValue::text(literal));
        }
    }

    path.pop();
    if out.is_empty() {
        None
    } else {
        Some(RawValue::Map(out))
    }
}
