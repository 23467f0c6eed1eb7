use super::types::{
    FieldDescriptor, FieldKind, KindRegistry, ModelDescriptor, ModelKind, ModelShape, NominalKind,
    ScalarKind,
};
use crate::document::{schema_ref_target, SchemaTable};
use crate::error::ResolveError;
use crate::naming::{camel_case, pascal_case};
use crate::resolver::resolve_type;
use crate::vendor;
use serde_json::Value;
use std::collections::HashSet;

const COMPOSITION_KEYS: [&str; 3] = ["allOf", "oneOf", "anyOf"];

/// Whether a schema materializes an object-kind model
///
/// Object-kind iff the schema declares `type: object` or has `properties`,
/// and carries no composition keyword; composition schemas remain inline
/// type expressions and never materialize fields.
pub fn is_object_schema(schema: &Value) -> bool {
    let Some(obj) = schema.as_object() else {
        return false;
    };
    let is_type_object = obj.get("type").and_then(Value::as_str) == Some("object");
    let has_properties = obj.contains_key("properties");
    let has_composition = COMPOSITION_KEYS.iter().any(|k| obj.contains_key(*k));
    (is_type_object || has_properties) && !has_composition
}

/// Whether a schema is an array of raw bytes
///
/// Such schemas never materialize models: a `$ref` to one inlines as a plain
/// byte field, and array items referencing one classify as byte items.
pub fn is_byte_array_schema(schema: &Value, schemas: &SchemaTable) -> bool {
    let resolved = deref_schema(schema, schemas);
    if resolved.get("type").and_then(Value::as_str) != Some("array") {
        return false;
    }
    let Some(items) = resolved.get("items") else {
        return false;
    };
    let items = deref_schema(items, schemas);
    items.get("type").and_then(Value::as_str) == Some("string")
        && (items.get("format").and_then(Value::as_str) == Some("byte")
            || vendor::flag(items, vendor::BYTES_BASE64))
}

/// Follow `$ref` chains to the underlying schema node
///
/// Reference chains in real documents are one hop; the bound keeps cyclic
/// chains terminating.
fn deref_schema<'a>(schema: &'a Value, schemas: &'a SchemaTable) -> &'a Value {
    let mut current = schema;
    for _ in 0..8 {
        let Some(ref_path) = current.get("$ref").and_then(Value::as_str) else {
            return current;
        };
        let Some(name) = ref_path.rsplit('/').next() else {
            return current;
        };
        match schemas.get(name) {
            Some(target) => current = target,
            None => return current,
        }
    }
    current
}

fn structural_kind(schema: &Value) -> ModelKind {
    if schema.get("type").and_then(Value::as_str) == Some("array") {
        ModelKind::Array
    } else if is_object_schema(schema) {
        ModelKind::Object
    } else {
        ModelKind::Primitive
    }
}

impl KindRegistry {
    /// Phase one: record every schema's structural kind before any codec
    /// synthesis runs for any schema
    ///
    /// The per-schema processing order in phase two is unconstrained once
    /// this table exists.
    pub fn from_schemas(schemas: &SchemaTable) -> KindRegistry {
        KindRegistry::from_entries(
            schemas
                .iter()
                .filter(|&(_, schema)| !is_byte_array_schema(schema, schemas))
                .map(|(name, schema)| (pascal_case(name), structural_kind(schema))),
        )
    }
}

/// Build the descriptor for one named schema
///
/// Top-level array schemas produce an array-shaped descriptor carrying only
/// the item classification; object schemas carry a field list; everything
/// else (primitive aliases, compositions) is a primitive-alias descriptor.
///
/// # Errors
///
/// Fails on dangling `$ref` targets anywhere in the schema's properties.
pub fn build_model_descriptor(
    name: &str,
    schema: &Value,
    schemas: &SchemaTable,
) -> Result<ModelDescriptor, ResolveError> {
    let model_name = pascal_case(name);

    if schema.get("type").and_then(Value::as_str) == Some("array") {
        let items = schema.get("items").cloned().unwrap_or(Value::Null);
        let item = classify_item(&items, schemas)?;
        return Ok(ModelDescriptor {
            name: model_name,
            shape: ModelShape::Array { item },
        });
    }

    if !is_object_schema(schema) {
        return Ok(ModelDescriptor {
            name: model_name,
            shape: ModelShape::Primitive,
        });
    }

    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (wire_name, prop_schema) in props {
            let canonical = vendor::rename(prop_schema).unwrap_or(wire_name.as_str()).to_string();
            let is_array = prop_schema.get("type").and_then(Value::as_str) == Some("array");
            let kind = if is_array {
                let items = prop_schema.get("items").cloned().unwrap_or(Value::Null);
                classify_item(&items, schemas)?
            } else {
                classify_field(&model_name, &canonical, prop_schema, schemas)?
            };
            fields.push(FieldDescriptor {
                name: camel_case(&canonical),
                wire_name: wire_name.clone(),
                ty: resolve_type(prop_schema, schemas)?,
                kind,
                is_array,
                optional: !required.contains(wire_name.as_str()),
                nullable: prop_schema.get("nullable").and_then(Value::as_bool) == Some(true),
            });
        }
    }

    Ok(ModelDescriptor {
        name: model_name,
        shape: ModelShape::Object { fields },
    })
}

/// Classify one non-array property schema, by fixed precedence:
/// reference → vendor nominal → inline object → empty object → scalar.
fn classify_field(
    model_name: &str,
    canonical: &str,
    schema: &Value,
    schemas: &SchemaTable,
) -> Result<FieldKind, ResolveError> {
    if let Some(ref_path) = schema.get("$ref").and_then(Value::as_str) {
        let target = schema_ref_target(ref_path, schemas)?;
        if let Some(kind) = byte_array_ref_kind(&target, schemas) {
            return Ok(kind);
        }
        return Ok(FieldKind::Reference(pascal_case(&target)));
    }
    if let Some(nominal) = nominal_kind(schema) {
        return Ok(FieldKind::Nominal(nominal));
    }

    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let properties = schema.get("properties").and_then(Value::as_object);
    if is_object {
        match properties {
            Some(props) if !props.is_empty() => {
                return Ok(FieldKind::InlineObject {
                    meta_name: format!("{}{}Meta", model_name, pascal_case(canonical)),
                });
            }
            Some(_) if !vendor::has_extensions(schema) => {
                return Ok(FieldKind::EmptyObject);
            }
            _ => {}
        }
    }

    Ok(FieldKind::Scalar(scalar_kind(schema)))
}

/// Classify an array item schema
///
/// Items follow the same precedence as fields, minus inline-object
/// promotion: item schemas without a reference or nominal marker always
/// classify as scalars.
fn classify_item(items: &Value, schemas: &SchemaTable) -> Result<FieldKind, ResolveError> {
    if let Some(ref_path) = items.get("$ref").and_then(Value::as_str) {
        let target = schema_ref_target(ref_path, schemas)?;
        if let Some(kind) = byte_array_ref_kind(&target, schemas) {
            return Ok(kind);
        }
        return Ok(FieldKind::Reference(pascal_case(&target)));
    }
    if let Some(nominal) = nominal_kind(items) {
        return Ok(FieldKind::Nominal(nominal));
    }
    Ok(FieldKind::Scalar(scalar_kind(items)))
}

/// Byte inlining for references to byte-array schemas
///
/// A `$ref` whose target is an array of raw bytes classifies as a plain
/// byte scalar instead of a model reference; the target never materializes.
fn byte_array_ref_kind(target: &str, schemas: &SchemaTable) -> Option<FieldKind> {
    let schema = schemas.get(target)?;
    if is_byte_array_schema(schema, schemas) {
        Some(FieldKind::Scalar(ScalarKind::Bytes {
            base64: false,
            fixed_len: None,
        }))
    } else {
        None
    }
}

fn nominal_kind(schema: &Value) -> Option<NominalKind> {
    if vendor::flag(schema, vendor::SIGNED_TXN) {
        Some(NominalKind::SignedTransaction)
    } else if vendor::flag(schema, vendor::BOX_REFERENCE) {
        Some(NominalKind::BoxReference)
    } else if vendor::flag(schema, vendor::HOLDING_REFERENCE) {
        Some(NominalKind::HoldingReference)
    } else if vendor::flag(schema, vendor::LOCALS_REFERENCE) {
        Some(NominalKind::LocalsReference)
    } else {
        None
    }
}

/// Scalar precedence: bytes → bigint → address → number → boolean → text
fn scalar_kind(schema: &Value) -> ScalarKind {
    let declared = schema.get("type").and_then(Value::as_str);
    let format = schema.get("format").and_then(Value::as_str);
    let base64 = vendor::flag(schema, vendor::BYTES_BASE64);
    if format == Some("byte") || base64 {
        return ScalarKind::Bytes {
            base64,
            fixed_len: vendor::u64_value(schema, vendor::BYTE_LENGTH),
        };
    }
    if vendor::flag(schema, vendor::BIGINT) {
        return ScalarKind::BigInt;
    }
    if vendor::is_address(schema) {
        return ScalarKind::Address;
    }
    match declared {
        Some("number") | Some("integer") => ScalarKind::Number,
        Some("boolean") => ScalarKind::Boolean,
        _ => ScalarKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(entries: &[(&str, Value)]) -> SchemaTable {
        let mut schemas = SchemaTable::new();
        for (name, schema) in entries {
            schemas.insert(name.to_string(), schema.clone());
        }
        schemas
    }

    #[test]
    fn test_registry_kinds() {
        let schemas = table(&[
            ("account", json!({ "type": "object", "properties": {} })),
            ("tx-list", json!({ "type": "array", "items": { "type": "string" } })),
            ("round", json!({ "type": "integer" })),
            ("combined", json!({ "allOf": [ { "type": "object" } ] })),
        ]);
        let registry = KindRegistry::from_schemas(&schemas);
        assert_eq!(registry.kind("Account"), Some(ModelKind::Object));
        assert_eq!(registry.kind("TxList"), Some(ModelKind::Array));
        assert_eq!(registry.kind("Round"), Some(ModelKind::Primitive));
        // Composition schemas never materialize object models.
        assert_eq!(registry.kind("Combined"), Some(ModelKind::Primitive));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_top_level_array_descriptor() {
        let schemas = table(&[("account", json!({ "type": "object" }))]);
        let descriptor = build_model_descriptor(
            "account-list",
            &json!({ "type": "array", "items": { "$ref": "#/components/schemas/account" } }),
            &schemas,
        )
        .unwrap();
        assert_eq!(descriptor.name, "AccountList");
        assert_eq!(
            descriptor.shape,
            ModelShape::Array {
                item: FieldKind::Reference("Account".to_string())
            }
        );
        assert_eq!(descriptor.kind(), ModelKind::Array);
    }

    #[test]
    fn test_field_kind_precedence() {
        let schemas = table(&[("asset", json!({ "type": "object" }))]);
        let descriptor = build_model_descriptor(
            "application",
            &json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer", "x-codegen-bigint": true },
                    "asset": { "$ref": "#/components/schemas/asset" },
                    "stx": { "type": "object", "x-codegen-signed-txn": true },
                    "params": {
                        "type": "object",
                        "properties": { "creator": { "type": "string" } }
                    },
                    "extra": { "type": "object", "properties": {} },
                    "note": { "type": "string", "format": "byte" },
                    "sender": { "type": "string", "x-codegen-format": "Address" },
                    "frozen": { "type": "boolean" }
                }
            }),
            &schemas,
        )
        .unwrap();

        let ModelShape::Object { fields } = &descriptor.shape else {
            panic!("expected object shape");
        };
        let kind_of = |name: &str| {
            fields
                .iter()
                .find(|f| f.wire_name == name)
                .map(|f| f.kind.clone())
                .unwrap()
        };
        assert_eq!(kind_of("id"), FieldKind::Scalar(ScalarKind::BigInt));
        assert_eq!(kind_of("asset"), FieldKind::Reference("Asset".to_string()));
        assert_eq!(
            kind_of("stx"),
            FieldKind::Nominal(NominalKind::SignedTransaction)
        );
        assert_eq!(
            kind_of("params"),
            FieldKind::InlineObject {
                meta_name: "ApplicationParamsMeta".to_string()
            }
        );
        assert_eq!(kind_of("extra"), FieldKind::EmptyObject);
        assert_eq!(
            kind_of("note"),
            FieldKind::Scalar(ScalarKind::Bytes {
                base64: false,
                fixed_len: None
            })
        );
        assert_eq!(kind_of("sender"), FieldKind::Scalar(ScalarKind::Address));
        assert_eq!(kind_of("frozen"), FieldKind::Scalar(ScalarKind::Boolean));

        let id = fields.iter().find(|f| f.wire_name == "id").unwrap();
        assert!(!id.optional);
        let asset = fields.iter().find(|f| f.wire_name == "asset").unwrap();
        assert!(asset.optional);
    }

    #[test]
    fn test_array_field_classifies_items() {
        let schemas = table(&[("asset", json!({ "type": "object" }))]);
        let descriptor = build_model_descriptor(
            "account",
            &json!({
                "type": "object",
                "properties": {
                    "assets": { "type": "array", "items": { "$ref": "#/components/schemas/asset" } },
                    "keys": {
                        "type": "array",
                        "items": { "type": "string", "format": "byte", "x-codegen-byte-length": 32 }
                    }
                }
            }),
            &schemas,
        )
        .unwrap();
        let ModelShape::Object { fields } = &descriptor.shape else {
            panic!("expected object shape");
        };
        let assets = fields.iter().find(|f| f.wire_name == "assets").unwrap();
        assert!(assets.is_array);
        assert_eq!(assets.kind, FieldKind::Reference("Asset".to_string()));
        let keys = fields.iter().find(|f| f.wire_name == "keys").unwrap();
        assert_eq!(
            keys.kind,
            FieldKind::Scalar(ScalarKind::Bytes {
                base64: false,
                fixed_len: Some(32)
            })
        );
    }

    #[test]
    fn test_byte_array_refs_inline_as_byte_fields() {
        let schemas = table(&[(
            "signed-txn-bytes",
            json!({ "type": "array", "items": { "type": "string", "format": "byte" } }),
        )]);

        // Byte-array schemas never register as models.
        let registry = KindRegistry::from_schemas(&schemas);
        assert!(!registry.is_model("SignedTxnBytes"));

        let descriptor = build_model_descriptor(
            "block",
            &json!({
                "type": "object",
                "properties": {
                    "txn": { "$ref": "#/components/schemas/signed-txn-bytes" },
                    "txns": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/signed-txn-bytes" }
                    }
                }
            }),
            &schemas,
        )
        .unwrap();
        let ModelShape::Object { fields } = &descriptor.shape else {
            panic!("expected object shape");
        };
        let txn = fields.iter().find(|f| f.wire_name == "txn").unwrap();
        assert_eq!(
            txn.kind,
            FieldKind::Scalar(ScalarKind::Bytes {
                base64: false,
                fixed_len: None
            })
        );
        assert!(!txn.is_array);
        let txns = fields.iter().find(|f| f.wire_name == "txns").unwrap();
        assert!(txns.is_array);
        assert_eq!(
            txns.kind,
            FieldKind::Scalar(ScalarKind::Bytes {
                base64: false,
                fixed_len: None
            })
        );
    }

    #[test]
    fn test_rename_marker_sets_canonical_name() {
        let schemas = SchemaTable::new();
        let descriptor = build_model_descriptor(
            "box",
            &json!({
                "type": "object",
                "properties": {
                    "app-idx": { "type": "integer", "x-codegen-field-rename": "applicationIndex" }
                }
            }),
            &schemas,
        )
        .unwrap();
        let ModelShape::Object { fields } = &descriptor.shape else {
            panic!("expected object shape");
        };
        assert_eq!(fields[0].wire_name, "app-idx");
        assert_eq!(fields[0].name, "applicationIndex");
    }
}
