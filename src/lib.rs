//! # oasgraph
//!
//! **oasgraph** compiles an OpenAPI-style schema and operation document into a
//! resolved, codec-aware type graph that downstream emitters turn into typed
//! client code.
//!
//! ## Overview
//!
//! The input is an already-parsed JSON document; the output is a
//! [`ResolvedGraph`] carrying model descriptors, a structural kind registry,
//! operation descriptors, and the schema subset those operations actually
//! reach. The whole transformation is a pure, single-threaded function over
//! the document: no I/O, no shared state, deterministic output for a given
//! input.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`document`]** - Keyed access to schemas, shared parameters, and path operations
//! - **[`resolver`]** - Schema node → resolved type expression ([`resolver::TypeExpr`])
//! - **[`model`]** - Named schema → structural descriptor plus the kind registry
//! - **[`codec`]** - Field descriptor → wire codec expression
//! - **[`operation`]** - Path operation → resolved call descriptor, with response model synthesis
//! - **[`closure`]** - Entry types → minimal transitive dependency closure
//! - **[`surface`]** - External per-surface visibility overrides
//! - **[`vendor`]** - The recognized `x-codegen-*` extension namespace
//! - **[`naming`]** - Deterministic wire-name ↔ surface-name conversion
//!
//! ## Example
//!
//! ```no_run
//! use oasgraph::{resolve_document, Document};
//!
//! # fn main() -> anyhow::Result<()> {
//! let raw: serde_json::Value = serde_json::from_str(r#"{ "paths": {} }"#)?;
//! let document = Document::from_value(raw)?;
//! let graph = resolve_document(&document, None)?;
//! for op in &graph.operations {
//!     println!("{} {} -> {}", op.method, op.path, op.response);
//! }
//! # Ok(())
//! # }
//! ```

pub mod closure;
pub mod codec;
pub mod document;
pub mod error;
pub mod model;
pub mod naming;
pub mod operation;
pub mod resolver;
pub mod surface;
pub mod vendor;

pub use document::{Document, SchemaTable};
pub use surface::{SurfaceConfig, SurfaceOverrides};

use anyhow::Context;
use closure::{collect_type_refs, transitive_closure};
use model::{build_model_descriptor, KindRegistry, ModelDescriptor};
use naming::pascal_case;
use operation::{OperationBuilder, OperationDescriptor, Visibility};
use std::collections::BTreeSet;

/// The fully resolved output of one generation run
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    /// Descriptors for every model in the dependency closure, sorted by name
    pub models: Vec<ModelDescriptor>,
    /// Structural kinds of every declared and synthesized schema
    pub registry: KindRegistry,
    /// All operation descriptors, sorted by operation id
    pub operations: Vec<OperationDescriptor>,
    /// Raw schemas restricted to the dependency closure, keyed by canonical
    /// name for declared and synthesized models alike
    pub schemas: SchemaTable,
}

/// Resolve a document into a complete type graph
///
/// Operation building runs first because it synthesizes models from inline
/// response schemas; the kind registry then covers declared and synthesized
/// schemas together before any descriptor or codec work starts. Models and
/// schemas in the result are restricted to the transitive dependency closure
/// of the operations that survive visibility filtering.
///
/// # Errors
///
/// Fails on structurally invalid documents and on unresolvable references.
pub fn resolve_document(
    document: &Document,
    surface: Option<&SurfaceConfig>,
) -> anyhow::Result<ResolvedGraph> {
    let mut builder = OperationBuilder::new(document);
    let mut operations = builder
        .build_all()
        .context("failed to build operation descriptors")?;
    let synthesized = builder.into_synthesized();

    tracing::debug!(
        operations = operations.len(),
        synthesized = synthesized.len(),
        "operations resolved"
    );

    // Merged table: declared schemas under raw names, synthesized under
    // their allocated canonical names.
    let mut schemas = document.schemas().clone();
    schemas.extend(synthesized);

    let registry = KindRegistry::from_schemas(&schemas);

    if let Some(config) = surface {
        config.apply(&mut operations);
    }
    operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));

    let entry = entry_types(&operations);
    let reachable = transitive_closure(&entry, &schemas, &registry);

    let mut models = Vec::with_capacity(reachable.len());
    let mut retained_schemas = SchemaTable::new();
    for (name, schema) in &schemas {
        let canonical = pascal_case(name);
        if !reachable.contains(&canonical) {
            continue;
        }
        let descriptor = build_model_descriptor(name, schema, &schemas)
            .with_context(|| format!("failed to build model descriptor for `{canonical}`"))?;
        models.push(descriptor);
        retained_schemas.insert(canonical, schema.clone());
    }
    models.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        models = models.len(),
        registered = registry.len(),
        "dependency closure computed"
    );

    Ok(ResolvedGraph {
        models,
        registry,
        operations,
        schemas: retained_schemas,
    })
}

/// Canonical model names referenced directly by retained operations
fn entry_types(operations: &[OperationDescriptor]) -> BTreeSet<String> {
    let mut entry = BTreeSet::new();
    for op in operations {
        if op.visibility == Visibility::Skip {
            continue;
        }
        entry.extend(collect_type_refs(&op.response));
        if let Some(body) = &op.request_body {
            entry.extend(collect_type_refs(&body.ty));
        }
        for param in &op.parameters {
            entry.extend(collect_type_refs(&param.ty));
        }
    }
    entry
}
