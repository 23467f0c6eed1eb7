//! Dependency Closure Calculator: entry types → minimal reachable model set.
//!
//! Reference extraction walks resolved type trees and raw schema nodes
//! structurally. The result is closed under reference and contains only
//! registered model names, so emitted output never carries unused models or
//! dangles a reference.

use crate::document::SchemaTable;
use crate::model::KindRegistry;
use crate::naming::pascal_case;
use crate::resolver::{AdditionalProps, TypeExpr};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Collect every model reference in a resolved type expression
pub fn collect_type_refs(ty: &TypeExpr) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    walk_type(ty, &mut refs);
    refs
}

fn walk_type(ty: &TypeExpr, refs: &mut BTreeSet<String>) {
    match ty {
        TypeExpr::Reference(name) => {
            refs.insert(name.clone());
        }
        TypeExpr::Array(inner) => walk_type(inner, refs),
        TypeExpr::Union(members) | TypeExpr::Intersection(members) => {
            for member in members {
                walk_type(member, refs);
            }
        }
        TypeExpr::InlineObject { fields, additional } => {
            for field in fields {
                walk_type(&field.ty, refs);
            }
            if let Some(AdditionalProps::Schema(inner)) = additional {
                walk_type(inner, refs);
            }
        }
        TypeExpr::Primitive(_) | TypeExpr::LiteralUnion(_) => {}
    }
}

/// Collect canonicalized schema names referenced by a raw schema node
///
/// Walks `$ref`, array items, object properties, composition members, and
/// `additionalProperties` iteratively; nesting depth is unbounded in real
/// documents.
pub fn schema_refs(schema: &Value) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    let mut stack = vec![schema];

    while let Some(node) = stack.pop() {
        let Some(obj) = node.as_object() else {
            continue;
        };
        if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
            if let Some(name) = ref_path.rsplit('/').next() {
                refs.insert(pascal_case(name));
            }
        }
        if let Some(items) = obj.get("items") {
            stack.push(items);
        }
        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            stack.extend(props.values());
        }
        for key in ["allOf", "oneOf", "anyOf"] {
            if let Some(members) = obj.get(key).and_then(Value::as_array) {
                stack.extend(members);
            }
        }
        if let Some(additional @ Value::Object(_)) = obj.get("additionalProperties") {
            stack.push(additional);
        }
    }
    refs
}

/// Expand an entry set to its transitive reference closure
///
/// Names are matched against the schema table through the same
/// canonicalization used everywhere else, and only names registered as
/// models survive into the result. Cycles terminate through the visited set.
pub fn transitive_closure(
    entry: &BTreeSet<String>,
    schemas: &SchemaTable,
    registry: &KindRegistry,
) -> BTreeSet<String> {
    // Canonical name → raw document key, for schema lookup during the walk.
    let raw_by_canonical: HashMap<String, &String> = schemas
        .keys()
        .map(|raw| (pascal_case(raw), raw))
        .collect();

    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue: Vec<String> = entry.iter().cloned().collect();

    while let Some(name) = queue.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(raw) = raw_by_canonical.get(&name) else {
            continue;
        };
        if let Some(schema) = schemas.get(raw.as_str()) {
            for dep in schema_refs(schema) {
                if !visited.contains(&dep) {
                    queue.push(dep);
                }
            }
        }
    }

    visited
        .into_iter()
        .filter(|name| registry.is_model(name))
        .collect()
}
