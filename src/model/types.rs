use crate::resolver::TypeExpr;
use std::collections::HashMap;

/// Structural kind of a named model, recorded in the [`KindRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Object,
    Array,
    Primitive,
}

/// Nominal kinds introduced by vendor extension markers
///
/// These resolve to fixed named types with hand-maintained wire metadata in
/// the emitted runtime; the generator never recurses into their structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominalKind {
    SignedTransaction,
    BoxReference,
    HoldingReference,
    LocalsReference,
}

impl NominalKind {
    /// Name of the wire-metadata object backing this nominal type
    pub fn meta_name(self) -> &'static str {
        match self {
            NominalKind::SignedTransaction => "SignedTransactionMeta",
            NominalKind::BoxReference => "BoxReferenceMeta",
            NominalKind::HoldingReference => "HoldingReferenceMeta",
            NominalKind::LocalsReference => "LocalsReferenceMeta",
        }
    }
}

/// Scalar classification of a field or array item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bytes {
        /// Explicit base64-bytes marker (selects a distinct codec)
        base64: bool,
        /// Fixed byte length declared via the byte-length marker
        fixed_len: Option<u64>,
    },
    BigInt,
    Address,
    Number,
    Boolean,
    Text,
}

/// Semantic classification of a field, assigned exactly once
///
/// The variants are mutually exclusive and selected by a fixed precedence
/// order during model building; downstream consumers never re-derive or
/// combine flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Reference to a named model
    Reference(String),
    /// Vendor nominal marker
    Nominal(NominalKind),
    /// Inline nested object promoted to generated metadata
    InlineObject {
        /// Deterministic metadata name: `{ModelName}{PropertyPascal}Meta`
        meta_name: String,
    },
    /// Declared object with an empty property set and no vendor attributes
    EmptyObject,
    Scalar(ScalarKind),
}

/// One schema property (or array item) with resolved type and classification
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Canonical (possibly renamed) camelCase name
    pub name: String,
    /// Literal field name transmitted over the network
    pub wire_name: String,
    /// Resolved type expression
    pub ty: TypeExpr,
    /// Semantic classification; for array fields this classifies the item
    pub kind: FieldKind,
    pub is_array: bool,
    pub optional: bool,
    pub nullable: bool,
}

/// Structural shape of a model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelShape {
    Object { fields: Vec<FieldDescriptor> },
    /// Top-level array schema; carries only the item classification
    Array { item: FieldKind },
    /// Alias over a primitive or composition; never materializes fields
    Primitive,
}

/// One named model, built once per schema per generation run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Canonical model name
    pub name: String,
    pub shape: ModelShape,
}

impl ModelDescriptor {
    /// The registry kind corresponding to this descriptor's shape
    pub fn kind(&self) -> ModelKind {
        match self.shape {
            ModelShape::Object { .. } => ModelKind::Object,
            ModelShape::Array { .. } => ModelKind::Array,
            ModelShape::Primitive => ModelKind::Primitive,
        }
    }
}

/// Immutable model-name → structural-kind table
///
/// Phase one of the two-phase build: the registry is computed for every
/// schema in the document (declared and synthesized) before any codec
/// synthesis runs, because reference-kind codec selection depends on the
/// referent's kind. Scoped to a single generation run by construction; build
/// a new one per run instead of resetting shared state.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<String, ModelKind>,
}

impl KindRegistry {
    pub(crate) fn from_entries(entries: impl IntoIterator<Item = (String, ModelKind)>) -> Self {
        let mut kinds = HashMap::new();
        for (name, kind) in entries {
            if let Some(previous) = kinds.insert(name.clone(), kind) {
                if previous != kind {
                    tracing::warn!(
                        model = %name,
                        "duplicate model name canonicalized with conflicting kinds"
                    );
                }
            }
        }
        KindRegistry { kinds }
    }

    /// Registered kind for a canonical model name
    pub fn kind(&self, name: &str) -> Option<ModelKind> {
        self.kinds.get(name).copied()
    }

    /// Whether the name is a registered model
    pub fn is_model(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
