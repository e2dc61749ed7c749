use objmatch_types::TypeMeta;

use crate::error::MergeResult;

/// A merge-patch backend.
///
/// All byte arguments are serialized JSON objects and every returned patch
/// is a compact JSON object; the empty patch is `{}`. Implementations must be
/// stateless after construction so one instance can serve many concurrent
/// callers, hence the `Send + Sync` bound.
///
/// `type_meta` identifies the object's kind for backends that need a schema.
/// Schemaless backends ignore it.
pub trait MergePatcher: Send + Sync {
    /// Human-readable name of this backend (e.g., "json-merge").
    fn name(&self) -> &str;

    /// Patch that moves `current` toward `modified`, deleting only fields
    /// that `original` set and `modified` no longer sets.
    fn create_three_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
        type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>>;

    /// Patch that turns `original` into `modified`.
    fn create_two_way_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        type_meta: &TypeMeta,
    ) -> MergeResult<Vec<u8>>;

    /// Apply `patch` to `target` and return the patched document.
    fn apply_patch(&self, target: &[u8], patch: &[u8], type_meta: &TypeMeta) -> MergeResult<Vec<u8>>;
}
