//! Input boundary: an already-parsed schema/operation document.
//!
//! Loading and parsing from disk or network are external collaborators; this
//! core only ever sees a [`serde_json::Value`] tree. The [`Document`] wrapper
//! gives the rest of the pipeline keyed access to declared schemas, shared
//! parameters, and path operations, plus fail-fast `$ref` lookups.

use crate::error::{DocumentError, ResolveError};
use http::Method;
use serde_json::{Map, Value};

/// Declared schemas keyed by their raw document name
pub type SchemaTable = Map<String, Value>;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// HTTP methods recognized as operations under a path item
const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// One (path, method) operation together with its path-level parameters
#[derive(Debug, Clone)]
pub struct PathOperation<'a> {
    pub path: &'a str,
    pub method: Method,
    pub operation: &'a Value,
    /// Parameters declared on the path item, shared by all of its operations
    pub path_parameters: &'a [Value],
}

/// An already-parsed OpenAPI-style document
///
/// Owns the schema table, the shared parameter components, and the path map.
/// All lookups are by name; the document is immutable for the duration of a
/// generation run.
#[derive(Debug, Clone)]
pub struct Document {
    schemas: SchemaTable,
    parameters: Map<String, Value>,
    paths: Map<String, Value>,
}

impl Document {
    /// Build a document from a parsed JSON value
    ///
    /// `components.schemas`, `components.parameters`, and `paths` are all
    /// optional; when present they must be JSON objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or any present section has the wrong
    /// JSON shape.
    pub fn from_value(root: Value) -> Result<Self, DocumentError> {
        let root = match root {
            Value::Object(obj) => obj,
            _ => return Err(DocumentError::RootNotObject),
        };

        let components = match root.get("components") {
            None => Map::new(),
            Some(Value::Object(obj)) => obj.clone(),
            Some(_) => {
                return Err(DocumentError::InvalidSection {
                    section: "components".to_string(),
                })
            }
        };

        let schemas = section_object(&components, "schemas", "components.schemas")?;
        let parameters = section_object(&components, "parameters", "components.parameters")?;
        let paths = section_object(&root, "paths", "paths")?;

        Ok(Document {
            schemas,
            parameters,
            paths,
        })
    }

    /// The declared schema table, keyed by raw document name
    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    /// Look up one declared schema by its raw name
    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Resolve a `#/components/parameters/*` reference
    ///
    /// # Errors
    ///
    /// Returns an error when the path has an unrecognized shape or the target
    /// parameter is not declared.
    pub fn resolve_parameter_ref(&self, ref_path: &str) -> Result<&Value, ResolveError> {
        let name = ref_path.strip_prefix(PARAMETER_REF_PREFIX).ok_or_else(|| {
            ResolveError::UnsupportedRef {
                ref_path: ref_path.to_string(),
            }
        })?;
        self.parameters
            .get(name)
            .ok_or_else(|| ResolveError::UnresolvedRef {
                ref_path: ref_path.to_string(),
            })
    }

    /// All operations in the document, in path order
    ///
    /// Only recognized HTTP method keys under a path item become operations;
    /// other keys (`parameters`, `summary`, extensions) are skipped.
    pub fn operations(&self) -> Vec<PathOperation<'_>> {
        let mut out = Vec::new();
        for (path, item) in &self.paths {
            let Some(item_obj) = item.as_object() else {
                continue;
            };
            let path_parameters = item_obj
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for method_key in HTTP_METHODS {
                let Some(operation) = item_obj.get(method_key) else {
                    continue;
                };
                if !operation.is_object() {
                    continue;
                }
                let Ok(method) = Method::from_bytes(method_key.to_uppercase().as_bytes()) else {
                    continue;
                };
                out.push(PathOperation {
                    path,
                    method,
                    operation,
                    path_parameters,
                });
            }
        }
        out
    }
}

fn section_object(
    parent: &Map<String, Value>,
    key: &str,
    section: &str,
) -> Result<Map<String, Value>, DocumentError> {
    match parent.get(key) {
        None => Ok(Map::new()),
        Some(Value::Object(obj)) => Ok(obj.clone()),
        Some(_) => Err(DocumentError::InvalidSection {
            section: section.to_string(),
        }),
    }
}

/// Extract the target name of a schema reference and verify it is declared
///
/// # Errors
///
/// Returns an error for non-schema reference shapes and for targets absent
/// from the schema table; dangling references are never silently defaulted.
pub fn schema_ref_target(ref_path: &str, schemas: &SchemaTable) -> Result<String, ResolveError> {
    let name = ref_path
        .strip_prefix(SCHEMA_REF_PREFIX)
        .ok_or_else(|| ResolveError::UnsupportedRef {
            ref_path: ref_path.to_string(),
        })?;
    if !schemas.contains_key(name) {
        return Err(ResolveError::UnresolvedRef {
            ref_path: ref_path.to_string(),
        });
    }
    Ok(name.to_string())
}
