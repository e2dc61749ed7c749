//! Schema-aware strategic merge patch.
//!
//! Works like the JSON merge patch for objects and scalars, but list fields
//! declared with [`PatchStrategy::Merge`](crate::schema::PatchStrategy) are
//! merged item by item instead of being replaced. The patch language adds a
//! few directives for that:
//!
//! - `{"<key>": v, "$patch": "delete"}` inside a keyed list removes the item.
//! - `{"$patch": "replace"}` inside an object replaces it; as a list element
//!   it replaces the whole list.
//! - `{"$patch": "delete"}` as an object value deletes the field.
//! - `"$deleteFromPrimitiveList/<field>": [..]` removes values from a set list.
//! - `"$setElementOrder/<field>": [..]` gives the desired item order.

mod apply;
mod diff;

use serde_json::{Map, Value};
use tracing::trace;

use objmatch_types::TypeMeta;

use crate::canonical::{decode_object, encode};
use crate::error::{MergeError, MergeResult};
use crate::patcher::MergePatcher;
use crate::schema::{Schema, SchemaRegistry, EMPTY_SCHEMA};

use diff::DiffOptions;

pub const PATCH_DIRECTIVE: &str = "$patch";
pub const SET_ELEMENT_ORDER_PREFIX: &str = "$setElementOrder/";
pub const DELETE_FROM_PRIMITIVE_LIST_PREFIX: &str = "$deleteFromPrimitiveList/";

/// The structured backend.
///
/// Schemas come from a [`SchemaRegistry`]. Kinds without a registered schema
/// are patched with replace semantics for every list.
#[derive(Clone, Debug, Default)]
pub struct StrategicMergePatcher {
    registry: SchemaRegistry,
}

impl StrategicMergePatcher {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    fn schema_for(&self, type_meta: &TypeMeta) -> MergeResult<&Schema> {
        if type_meta.is_empty() {
            return Err(MergeError::MissingTypeMeta);
        }
        Ok(self.registry.get(type_meta).unwrap_or(&EMPTY_SCHEMA))
    }
}

impl MergePatcher for StrategicMergePatcher {
    fn name(&self) -> &str {
        "strategic-merge"
    }

    fn create_three_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
        type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>> {
        let schema = self.schema_for(type_meta)?;
        let original = decode_object(original, "original")?;
        let modified = decode_object(modified, "modified")?;
        let current = decode_object(current, "current")?;

        let deltas = diff::diff_maps(&current, &modified, schema, "", DiffOptions::IGNORE_DELETIONS)?;
        let deletions = diff::diff_maps(
            &original,
            &modified,
            schema,
            "",
            DiffOptions::IGNORE_CHANGES_AND_ADDITIONS,
        )?;
        trace!(
            kind = %type_meta,
            deltas = deltas.len(),
            deletions = deletions.len(),
            "strategic three-way components"
        );

        let patch = diff::combine_patches(deletions, deltas, schema, "");
        encode(&Value::Object(patch))
    }

    fn create_two_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>> {
        let schema = self.schema_for(type_meta)?;
        let original = decode_object(original, "original")?;
        let modified = decode_object(modified, "modified")?;
        let patch = diff::diff_maps(&original, &modified, schema, "", DiffOptions::ALL)?;
        encode(&Value::Object(patch))
    }

    fn apply_patch(&self, target: &[u8], patch: &[u8], type_meta: &TypeMeta) -> MergeResult<Vec<u8>> {
        let schema = self.schema_for(type_meta)?;
        let target = decode_object(target, "patch target")?;
        let patch = decode_object(patch, "patch")?;
        let patched = apply::merge_map(target, &patch, schema, "")?;
        encode(&Value::Object(patched))
    }
}

/// The merge key value and fields of a keyed list item.
pub(crate) fn keyed<'v>(
    item: &'v Value,
    merge_key: &str,
    path: &str,
) -> MergeResult<(&'v Value, &'v Map<String, Value>)> {
    item.as_object()
        .and_then(|map| map.get(merge_key).map(|key| (key, map)))
        .ok_or_else(|| MergeError::MissingMergeKey {
            path: path.to_string(),
            key: merge_key.to_string(),
        })
}

/// Returns `true` for an object carrying `"$patch": "<directive>"`.
pub(crate) fn has_directive(map: &Map<String, Value>, directive: &str) -> bool {
    matches!(map.get(PATCH_DIRECTIVE), Some(Value::String(d)) if d == directive)
}

/// Dotted path of `key` under `parent`.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
