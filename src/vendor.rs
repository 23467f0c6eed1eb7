//! Recognized vendor-extension keys and typed accessors.
//!
//! The extension namespace is fixed: new markers may be added by appending
//! precedence-table entries, but existing entries are never reordered.

use serde_json::Value;

/// Renames a wire field to a different canonical identifier in generated code
pub const FIELD_RENAME: &str = "x-codegen-field-rename";
/// Marks an integer as requiring an arbitrary-precision representation
pub const BIGINT: &str = "x-codegen-bigint";
/// Marks a string as base64-encoded bytes (distinct codec from `format: byte`)
pub const BYTES_BASE64: &str = "x-codegen-bytes-base64";
/// Nominal marker: the value is a signed transaction blob
pub const SIGNED_TXN: &str = "x-codegen-signed-txn";
/// Nominal marker: box reference
pub const BOX_REFERENCE: &str = "x-codegen-box-reference";
/// Nominal marker: asset holding reference
pub const HOLDING_REFERENCE: &str = "x-codegen-holding-reference";
/// Nominal marker: application locals reference
pub const LOCALS_REFERENCE: &str = "x-codegen-locals-reference";
/// Declares a fixed byte length for a byte-typed value
pub const BYTE_LENGTH: &str = "x-codegen-byte-length";
/// Target-surface format override; the value `Address` marks address fields
pub const TARGET_FORMAT: &str = "x-codegen-format";

/// Common prefix of every recognized extension key
pub const EXTENSION_PREFIX: &str = "x-codegen-";

/// Returns `true` if `key` is set to the literal boolean `true` on the schema
pub fn flag(schema: &Value, key: &str) -> bool {
    schema.get(key).and_then(Value::as_bool) == Some(true)
}

/// Returns the string value of an extension key, if present and non-empty
pub fn string_value<'a>(schema: &'a Value, key: &str) -> Option<&'a str> {
    schema.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Returns the unsigned integer value of an extension key, if present
pub fn u64_value(schema: &Value, key: &str) -> Option<u64> {
    schema.get(key).and_then(Value::as_u64)
}

/// Canonical rename for a wire field, when the override marker is present
pub fn rename(schema: &Value) -> Option<&str> {
    string_value(schema, FIELD_RENAME)
}

/// Whether the schema carries the address-format marker
pub fn is_address(schema: &Value) -> bool {
    string_value(schema, TARGET_FORMAT) == Some("Address")
}

/// Whether the schema carries any recognized vendor-extension key
pub fn has_extensions(schema: &Value) -> bool {
    schema
        .as_object()
        .map(|obj| obj.keys().any(|k| k.starts_with(EXTENSION_PREFIX)))
        .unwrap_or(false)
}
