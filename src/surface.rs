//! External surface overrides.
//!
//! Which operations a given client surface hides or wraps is deployment
//! policy, not document semantics, so it arrives as configuration instead of
//! living in tables here. Injection fragments are carried opaquely for the
//! downstream renderer.

use crate::operation::{OperationDescriptor, Visibility};
use serde::Deserialize;
use std::collections::HashMap;

/// Overrides for one generated client surface
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Operation ids emitted but kept off the public surface, usually
    /// because a custom method wraps them
    pub private_operations: Vec<String>,
    /// Operation ids excluded from emission entirely
    pub skip_operations: Vec<String>,
    /// Import fragments injected verbatim into the emitted surface
    pub custom_imports: Vec<String>,
    /// Method bodies injected verbatim into the emitted surface
    pub custom_methods: Vec<String>,
}

/// Per-surface override tables, keyed by surface name
pub type SurfaceOverrides = HashMap<String, SurfaceConfig>;

impl SurfaceConfig {
    /// Mark operation visibility in place
    ///
    /// Skip always wins over private. Operations the document already
    /// excluded stay excluded.
    pub fn apply(&self, operations: &mut [OperationDescriptor]) {
        for op in operations.iter_mut() {
            if op.visibility == Visibility::Skip {
                continue;
            }
            if self.skip_operations.contains(&op.operation_id) {
                op.visibility = Visibility::Skip;
            } else if self.private_operations.contains(&op.operation_id) {
                op.visibility = Visibility::Private;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Primitive, TypeExpr};
    use http::Method;

    fn op(id: &str, visibility: Visibility) -> OperationDescriptor {
        OperationDescriptor {
            operation_id: id.to_string(),
            method: Method::GET,
            path: format!("/v2/{id}"),
            description: None,
            tags: vec!["default".to_string()],
            parameters: vec![],
            request_body: None,
            response: TypeExpr::Primitive(Primitive::Void),
            returns_msgpack: false,
            force_msgpack_query: false,
            visibility,
        }
    }

    #[test]
    fn test_apply_marks_visibility() {
        let config = SurfaceConfig {
            private_operations: vec!["RawTransaction".to_string()],
            skip_operations: vec!["GetLedger".to_string()],
            ..SurfaceConfig::default()
        };
        let mut ops = vec![
            op("RawTransaction", Visibility::Public),
            op("GetLedger", Visibility::Public),
            op("GetStatus", Visibility::Public),
            op("Metrics", Visibility::Skip),
        ];
        config.apply(&mut ops);
        assert_eq!(ops[0].visibility, Visibility::Private);
        assert_eq!(ops[1].visibility, Visibility::Skip);
        assert_eq!(ops[2].visibility, Visibility::Public);
        assert_eq!(ops[3].visibility, Visibility::Skip);
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: SurfaceConfig = serde_json::from_str(
            r#"{ "private_operations": ["CreateWallet"] }"#,
        )
        .unwrap();
        assert_eq!(config.private_operations, vec!["CreateWallet"]);
        assert!(config.skip_operations.is_empty());
        assert!(config.custom_imports.is_empty());
    }
}
