//! Schemaless JSON merge patch (RFC 7396).
//!
//! A key present in the patch replaces the target's value, an explicit `null`
//! deletes it, and absent keys are left alone. Nested objects merge
//! recursively; arrays are always replaced wholesale.

use serde_json::{Map, Value};
use tracing::trace;

use objmatch_types::TypeMeta;

use crate::canonical::{decode_object, encode};
use crate::error::MergeResult;
use crate::patcher::MergePatcher;

/// The generic backend, used for objects without a schema.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMergePatcher;

impl MergePatcher for JsonMergePatcher {
    fn name(&self) -> &str {
        "json-merge"
    }

    fn create_three_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
        _type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>> {
        let original = decode_object(original, "original")?;
        let modified = decode_object(modified, "modified")?;
        let current = decode_object(current, "current")?;

        // Additions and changes come from the live state, deletions only from
        // what we previously applied.
        let additions = filter_nulls(diff_objects(&current, &modified), false);
        let deletions = filter_nulls(diff_objects(&original, &modified), true);
        trace!(
            additions = additions.len(),
            deletions = deletions.len(),
            "json merge three-way components"
        );

        let patch = merge_patch(Value::Object(deletions), &Value::Object(additions));
        encode(&patch)
    }

    fn create_two_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        _type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>> {
        let original = decode_object(original, "original")?;
        let modified = decode_object(modified, "modified")?;
        encode(&Value::Object(diff_objects(&original, &modified)))
    }

    fn apply_patch(&self, target: &[u8], patch: &[u8], _type_meta: &TypeMeta) -> MergeResult<Vec<u8>> {
        let target = decode_object(target, "patch target")?;
        let patch = decode_object(patch, "patch")?;
        encode(&merge_patch(Value::Object(target), &Value::Object(patch)))
    }
}

/// Compute the merge patch that turns `original` into `modified`.
pub fn diff_objects(original: &Map<String, Value>, modified: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for (key, new) in modified {
        match (original.get(key), new) {
            (Some(old), _) if old == new => {}
            (Some(Value::Object(old)), Value::Object(new)) => {
                let nested = diff_objects(old, new);
                if !nested.is_empty() {
                    patch.insert(key.clone(), Value::Object(nested));
                }
            }
            _ => {
                patch.insert(key.clone(), new.clone());
            }
        }
    }

    for key in original.keys() {
        if !modified.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }

    patch
}

/// Apply an RFC 7396 merge patch to `target`.
pub fn merge_patch(target: Value, patch: &Value) -> Value {
    let Value::Object(patch) = patch else {
        return patch.clone();
    };
    let mut target = match target {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
            continue;
        }
        match target.get_mut(key) {
            Some(slot) => {
                let existing = std::mem::take(slot);
                *slot = merge_patch(existing, value);
            }
            None => {
                target.insert(key.clone(), merge_patch(Value::Null, value));
            }
        }
    }

    Value::Object(target)
}

/// Keep only the deletions (`keep_nulls`) or only the additions and changes
/// (`!keep_nulls`) of a merge patch.
///
/// An explicitly empty object is a value, not an empty sub-patch, so it
/// counts as a change. A nested patch that filters down to nothing is dropped.
fn filter_nulls(patch: Map<String, Value>, keep_nulls: bool) -> Map<String, Value> {
    let mut filtered = Map::new();
    for (key, value) in patch {
        match value {
            Value::Null => {
                if keep_nulls {
                    filtered.insert(key, Value::Null);
                }
            }
            Value::Object(inner) if inner.is_empty() => {
                if !keep_nulls {
                    filtered.insert(key, Value::Object(inner));
                }
            }
            Value::Object(inner) => {
                let inner = filter_nulls(inner, keep_nulls);
                if !inner.is_empty() {
                    filtered.insert(key, Value::Object(inner));
                }
            }
            other => {
                if !keep_nulls {
                    filtered.insert(key, other);
                }
            }
        }
    }
    filtered
}
