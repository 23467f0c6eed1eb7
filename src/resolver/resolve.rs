use super::types::{AdditionalProps, InlineField, Literal, Primitive, TypeExpr};
use crate::document::{schema_ref_target, SchemaTable};
use crate::error::ResolveError;
use crate::naming::{camel_case, pascal_case};
use crate::vendor;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Fixed nominal type produced by the signed-transaction vendor marker
pub const SIGNED_TRANSACTION: &str = "SignedTransaction";

/// Resolve a schema node to a type expression
///
/// Resolution precedence, first match wins:
///
/// 1. signed-transaction vendor marker → fixed nominal type, no recursion
/// 2. `$ref` → nominal reference to the canonicalized target name
/// 3. `allOf` / `oneOf` / `anyOf` → intersection / union of member types
/// 4. declared enumeration → literal union
/// 5. `type: array` → array of the recursively resolved item type
/// 6. object shape → inline object type
/// 7. primitive fallback table; unrecognized types degrade to `any`
///
/// The `nullable` flag and multi-type declarations containing `null` union
/// the result with `null`; both apply to every case except the vendor
/// nominal override.
///
/// # Errors
///
/// Fails fast on a `$ref` whose target is absent from the schema table.
pub fn resolve_type(schema: &Value, schemas: &SchemaTable) -> Result<TypeExpr, ResolveError> {
    let Some(obj) = schema.as_object() else {
        return Ok(TypeExpr::Primitive(Primitive::Any));
    };

    // 1. Vendor nominal override stops resolution outright.
    if vendor::flag(schema, vendor::SIGNED_TXN) {
        return Ok(TypeExpr::Reference(SIGNED_TRANSACTION.to_string()));
    }

    // 2. Explicit reference.
    if let Some(ref_path) = obj.get("$ref").and_then(Value::as_str) {
        let target = schema_ref_target(ref_path, schemas)?;
        return Ok(apply_nullable(TypeExpr::Reference(pascal_case(&target)), schema));
    }

    // 3. Composition.
    if let Some(members) = obj.get("allOf").and_then(Value::as_array) {
        let resolved = resolve_members(members, schemas)?;
        let expr = if members.is_empty() {
            TypeExpr::Primitive(Primitive::Never)
        } else {
            TypeExpr::intersection(resolved)
        };
        return Ok(apply_nullable(expr, schema));
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(members) = obj.get(key).and_then(Value::as_array) {
            let resolved = resolve_members(members, schemas)?;
            return Ok(apply_nullable(TypeExpr::union(resolved), schema));
        }
    }

    // 4. Declared enumeration.
    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        return Ok(apply_nullable(resolve_enum(schema, values), schema));
    }

    // Multi-type declarations are handled as part of nullable resolution.
    if obj.get("type").map(Value::is_array).unwrap_or(false) {
        return resolve_multi_type(schema, schemas);
    }

    let declared = obj.get("type").and_then(Value::as_str);

    // 5. Arrays.
    if declared == Some("array") {
        let items = obj.get("items").cloned().unwrap_or_else(|| json!({}));
        let inner = if vendor::flag(&items, vendor::SIGNED_TXN) {
            TypeExpr::Reference(SIGNED_TRANSACTION.to_string())
        } else {
            resolve_type(&items, schemas)?
        };
        return Ok(apply_nullable(TypeExpr::Array(Box::new(inner)), schema));
    }

    // 6. Objects, explicit or implied by properties/additionalProperties.
    let implied_object =
        declared.is_none() && (obj.contains_key("properties") || obj.contains_key("additionalProperties"));
    if declared == Some("object") || implied_object {
        return Ok(apply_nullable(resolve_object(schema, schemas)?, schema));
    }

    // 7. Primitive fallback.
    Ok(apply_nullable(resolve_primitive(declared, schema), schema))
}

fn resolve_members(members: &[Value], schemas: &SchemaTable) -> Result<Vec<TypeExpr>, ResolveError> {
    members.iter().map(|m| resolve_type(m, schemas)).collect()
}

fn resolve_enum(schema: &Value, values: &[Value]) -> TypeExpr {
    // Bigint-marked enums stay a plain bigint; the values are discriminants
    // on the wire, not part of the surface type.
    if vendor::flag(schema, vendor::BIGINT) {
        return TypeExpr::Primitive(Primitive::BigInt);
    }
    let declared = schema.get("type").and_then(Value::as_str);
    let literals = values
        .iter()
        .map(|v| match declared {
            Some("integer") => v
                .as_i64()
                .map(Literal::Int)
                .unwrap_or_else(|| Literal::Str(literal_text(v))),
            _ => Literal::Str(literal_text(v)),
        })
        .collect();
    TypeExpr::LiteralUnion(literals)
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve a multi-type declaration such as `type: ["string", "null"]`
///
/// Exactly one non-null member unions that member with null; several non-null
/// members union them all with null appended last. A type list without null
/// is an unrecognized declaration and degrades to `any`.
fn resolve_multi_type(schema: &Value, schemas: &SchemaTable) -> Result<TypeExpr, ResolveError> {
    let declared: Vec<&str> = schema
        .get("type")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !declared.contains(&"null") {
        return Ok(TypeExpr::Primitive(Primitive::Any));
    }
    let mut members = Vec::new();
    for ty in declared.iter().filter(|t| **t != "null") {
        members.push(resolve_type(&json!({ "type": ty }), schemas)?);
    }
    members.push(TypeExpr::Primitive(Primitive::Null));
    Ok(TypeExpr::union(members))
}

fn resolve_object(schema: &Value, schemas: &SchemaTable) -> Result<TypeExpr, ResolveError> {
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (wire_name, prop_schema) in props {
            let canonical = vendor::rename(prop_schema).unwrap_or(wire_name.as_str());
            fields.push(InlineField {
                name: camel_case(canonical),
                ty: resolve_type(prop_schema, schemas)?,
                optional: !required.contains(wire_name.as_str()),
            });
        }
    }

    let additional = match schema.get("additionalProperties") {
        Some(Value::Bool(true)) => Some(AdditionalProps::Unconstrained),
        Some(value @ Value::Object(_)) => Some(AdditionalProps::Schema(Box::new(resolve_type(
            value, schemas,
        )?))),
        _ => None,
    };

    Ok(TypeExpr::InlineObject { fields, additional })
}

fn resolve_primitive(declared: Option<&str>, schema: &Value) -> TypeExpr {
    let format = schema.get("format").and_then(Value::as_str);
    let primitive = match declared {
        Some("integer") => {
            if vendor::flag(schema, vendor::BIGINT) {
                Primitive::BigInt
            } else {
                Primitive::Number
            }
        }
        Some("number") => Primitive::Number,
        Some("string") => {
            if format == Some("byte") || vendor::flag(schema, vendor::BYTES_BASE64) {
                Primitive::Bytes
            } else {
                Primitive::Text
            }
        }
        Some("boolean") => Primitive::Boolean,
        // Unrecognized or absent types degrade to `any` to tolerate drift.
        _ => Primitive::Any,
    };
    TypeExpr::Primitive(primitive)
}

fn apply_nullable(expr: TypeExpr, schema: &Value) -> TypeExpr {
    if schema.get("nullable").and_then(Value::as_bool) == Some(true) {
        expr.nullable()
    } else {
        expr
    }
}
