use crate::error::OptionResult;
use crate::option::{edit_documents, remove_path, CalculateOption};

/// Metadata fields written by the store, never by a client.
pub const STORE_MANAGED_METADATA: &[&str] = &[
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "managedFields",
    "selfLink",
];

/// Removes store-managed metadata and the `status` subtree.
///
/// Identifiers, revision counters and timestamps change on every write, so
/// they would otherwise show up in every patch.
#[derive(Clone, Copy, Debug, Default)]
pub struct CleanMetadata;

impl CalculateOption for CleanMetadata {
    fn name(&self) -> &str {
        "clean-metadata"
    }

    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
        edit_documents(&current, &modified, |current, modified| {
            for document in [current, modified] {
                for field in STORE_MANAGED_METADATA {
                    remove_path(document, &["metadata", *field]);
                }
                document.remove("status");
            }
        })
    }
}

/// Removes the `status` subtree.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreStatusFields;

impl CalculateOption for IgnoreStatusFields {
    fn name(&self) -> &str {
        "ignore-status-fields"
    }

    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
        edit_documents(&current, &modified, |current, modified| {
            current.remove("status");
            modified.remove("status");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run(option: &dyn CalculateOption, current: Value, modified: Value) -> (Value, Value) {
        let (current, modified) = option
            .apply(
                serde_json::to_vec(&current).unwrap(),
                serde_json::to_vec(&modified).unwrap(),
            )
            .unwrap();
        (
            serde_json::from_slice(&current).unwrap(),
            serde_json::from_slice(&modified).unwrap(),
        )
    }

    #[test]
    fn clean_metadata_strips_store_fields() {
        let current = json!({
            "metadata": {
                "name": "web",
                "uid": "1234",
                "resourceVersion": "77",
                "generation": 3,
                "creationTimestamp": "2024-01-01T00:00:00Z",
                "managedFields": [{"manager": "kubectl"}],
                "selfLink": "/api/v1/web",
                "labels": {"app": "web"}
            },
            "spec": {"replicas": 2},
            "status": {"ready": true}
        });
        let modified = json!({"metadata": {"name": "web", "creationTimestamp": null}, "spec": {"replicas": 3}});

        let (current, modified) = run(&CleanMetadata, current, modified);
        assert_eq!(
            current,
            json!({"metadata": {"name": "web", "labels": {"app": "web"}}, "spec": {"replicas": 2}})
        );
        assert_eq!(modified, json!({"metadata": {"name": "web"}, "spec": {"replicas": 3}}));
    }

    #[test]
    fn clean_metadata_tolerates_missing_metadata() {
        let (current, modified) = run(&CleanMetadata, json!({"a": 1}), json!({"metadata": "odd"}));
        assert_eq!(current, json!({"a": 1}));
        assert_eq!(modified, json!({"metadata": "odd"}));
    }

    #[test]
    fn ignore_status_only_touches_status() {
        let (current, modified) = run(
            &IgnoreStatusFields,
            json!({"metadata": {"uid": "1"}, "status": {"phase": "Running"}}),
            json!({"status": null}),
        );
        assert_eq!(current, json!({"metadata": {"uid": "1"}}));
        assert_eq!(modified, json!({}));
    }
}
