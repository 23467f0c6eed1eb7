//! Codec Synthesizer: field descriptor → wire codec expression.
//!
//! Codecs pair encode/decode logic at the wire boundary of the emitted
//! client. Synthesis consults the [`KindRegistry`] populated by the model
//! builder, so the registry must cover every schema before any codec is
//! synthesized; reference-kind wrapper selection depends on the referent's
//! registered structural kind.

use crate::model::{FieldDescriptor, FieldKind, KindRegistry, ModelKind, ScalarKind};
use crate::resolver::{Primitive, TypeExpr};
use std::fmt;

/// Wrapper codec class for a model reference, chosen by registered kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecClass {
    Object,
    Array,
    Primitive,
    /// Referent kind unknown; falls back to the generic wrapper
    Generic,
}

impl CodecClass {
    fn class_name(self) -> &'static str {
        match self {
            CodecClass::Object => "ObjectModelCodec",
            CodecClass::Array => "ArrayModelCodec",
            CodecClass::Primitive => "PrimitiveModelCodec",
            CodecClass::Generic => "ModelCodec",
        }
    }

    fn for_kind(kind: Option<ModelKind>) -> CodecClass {
        match kind {
            Some(ModelKind::Object) => CodecClass::Object,
            Some(ModelKind::Array) => CodecClass::Array,
            Some(ModelKind::Primitive) => CodecClass::Primitive,
            None => CodecClass::Generic,
        }
    }
}

/// A synthesized codec expression
///
/// Rendered to the emission target by [`fmt::Display`]; the tree itself is
/// what tests and the renderer consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecExpr {
    /// A predefined singleton codec, referenced by name
    Singleton(&'static str),
    /// Fixed-length byte codec; common lengths render as singletons
    FixedBytes(u64),
    /// Generic array wrapper over an item codec
    Array(Box<CodecExpr>),
    /// Wrapper over a named model's wire metadata
    Model {
        class: CodecClass,
        meta: String,
        /// Self-referential models defer metadata lookup to first use; a
        /// direct construction would observe an incomplete definition
        /// during module initialization.
        lazy: bool,
    },
    /// Open record with unconstrained values (declared empty objects)
    Record,
    /// Nullable wrapper produced by fallback inference over `T | null`
    Nullable(Box<CodecExpr>),
}

impl fmt::Display for CodecExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecExpr::Singleton(name) => f.write_str(name),
            CodecExpr::FixedBytes(len) => match len {
                32 => f.write_str("fixedBytes32Codec"),
                64 => f.write_str("fixedBytes64Codec"),
                1793 => f.write_str("fixedBytes1793Codec"),
                other => write!(f, "new FixedBytesCodec({other})"),
            },
            CodecExpr::Array(item) => write!(f, "new ArrayCodec({item})"),
            CodecExpr::Model { class, meta, lazy } => {
                if *lazy {
                    write!(f, "new {}(() => {meta})", class.class_name())
                } else {
                    write!(f, "new {}({meta})", class.class_name())
                }
            }
            CodecExpr::Record => f.write_str("new RecordCodec(unknownCodec)"),
            CodecExpr::Nullable(inner) => write!(f, "new NullableCodec({inner})"),
        }
    }
}

/// Synthesize the codec expression for one field of a model
///
/// `model_name` is the enclosing model's canonical name, used to detect
/// self-references that require lazy construction.
pub fn field_codec(field: &FieldDescriptor, model_name: &str, registry: &KindRegistry) -> CodecExpr {
    if field.kind == FieldKind::EmptyObject {
        return CodecExpr::Record;
    }
    if field.is_array {
        if let Some(singleton) = array_singleton(&field.kind) {
            return singleton;
        }
        let item = base_codec(&field.kind, model_name, Some(&field.ty), registry);
        return CodecExpr::Array(Box::new(item));
    }
    base_codec(&field.kind, model_name, Some(&field.ty), registry)
}

/// Synthesize the item codec expression for a top-level array model
pub fn array_item_codec(item: &FieldKind, registry: &KindRegistry) -> CodecExpr {
    if let Some(singleton) = array_singleton(item) {
        return singleton;
    }
    // Top-level arrays have no enclosing model, so a self-reference cannot
    // occur here.
    let base = base_codec(item, "", None, registry);
    CodecExpr::Array(Box::new(base))
}

fn base_codec(
    kind: &FieldKind,
    model_name: &str,
    ty: Option<&TypeExpr>,
    registry: &KindRegistry,
) -> CodecExpr {
    match kind {
        FieldKind::Nominal(nominal) => CodecExpr::Model {
            class: CodecClass::Object,
            meta: nominal.meta_name().to_string(),
            lazy: false,
        },
        FieldKind::Reference(name) => CodecExpr::Model {
            class: CodecClass::for_kind(registry.kind(name)),
            meta: format!("{name}Meta"),
            lazy: name == model_name,
        },
        FieldKind::InlineObject { meta_name } => CodecExpr::Model {
            class: CodecClass::Object,
            meta: meta_name.clone(),
            lazy: false,
        },
        FieldKind::EmptyObject => CodecExpr::Record,
        FieldKind::Scalar(scalar) => match scalar {
            ScalarKind::Bytes {
                fixed_len: Some(len),
                ..
            } => CodecExpr::FixedBytes(*len),
            ScalarKind::Bytes { base64: true, .. } => CodecExpr::Singleton("bytesBase64Codec"),
            ScalarKind::Bytes { .. } => CodecExpr::Singleton("bytesCodec"),
            ScalarKind::BigInt => CodecExpr::Singleton("bigIntCodec"),
            ScalarKind::Address => CodecExpr::Singleton("addressCodec"),
            ScalarKind::Number => CodecExpr::Singleton("numberCodec"),
            ScalarKind::Boolean => CodecExpr::Singleton("booleanCodec"),
            ScalarKind::Text => match ty {
                Some(ty) => infer_codec(ty),
                None => CodecExpr::Singleton("stringCodec"),
            },
        },
    }
}

/// Fallback inference from a resolved type expression
///
/// Known primitive expressions map to their singletons; a union whose last
/// member is `null` unwraps, recurses on the inner type, and wraps the
/// result in a nullable codec. Anything else defaults to the text codec.
pub fn infer_codec(ty: &TypeExpr) -> CodecExpr {
    match ty {
        TypeExpr::Primitive(Primitive::Text) => CodecExpr::Singleton("stringCodec"),
        TypeExpr::Primitive(Primitive::Number) => CodecExpr::Singleton("numberCodec"),
        TypeExpr::Primitive(Primitive::BigInt) => CodecExpr::Singleton("bigIntCodec"),
        TypeExpr::Primitive(Primitive::Boolean) => CodecExpr::Singleton("booleanCodec"),
        TypeExpr::Primitive(Primitive::Bytes) => CodecExpr::Singleton("bytesCodec"),
        TypeExpr::Union(members)
            if members.last() == Some(&TypeExpr::Primitive(Primitive::Null)) =>
        {
            let inner = TypeExpr::union(members[..members.len() - 1].to_vec());
            CodecExpr::Nullable(Box::new(infer_codec(&inner)))
        }
        _ => CodecExpr::Singleton("stringCodec"),
    }
}

/// Singleton array codec for item kinds that have one
///
/// Fixed-length bytes, base64 bytes, references, inline objects, and vendor
/// nominal items never have array singletons.
fn array_singleton(kind: &FieldKind) -> Option<CodecExpr> {
    let scalar = match kind {
        FieldKind::Scalar(scalar) => scalar,
        _ => return None,
    };
    let name = match scalar {
        ScalarKind::Bytes { fixed_len: Some(_), .. } => return None,
        ScalarKind::Bytes { base64: true, .. } => return None,
        ScalarKind::Bytes { .. } => "bytesArrayCodec",
        ScalarKind::BigInt => "bigIntArrayCodec",
        ScalarKind::Address => "addressArrayCodec",
        ScalarKind::Number => "numberArrayCodec",
        ScalarKind::Boolean => "booleanArrayCodec",
        ScalarKind::Text => "stringArrayCodec",
    };
    Some(CodecExpr::Singleton(name))
}
