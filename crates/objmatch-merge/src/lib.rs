//! Merge-patch backends for objmatch.
//!
//! Everything here works on serialized JSON objects. The patch maker picks
//! one backend per call and drives it through the [`MergePatcher`] trait.
//!
//! # Key Types
//!
//! - [`MergePatcher`] -- Three-way, two-way and apply operations of a backend
//! - [`StrategicMergePatcher`] -- Schema-aware backend for structured objects
//! - [`JsonMergePatcher`] -- RFC 7396 backend for generic objects
//! - [`SchemaRegistry`] / [`Schema`] / [`FieldStrategy`] -- Per-kind list merge metadata
//! - [`prune_nulls`] -- Canonicalization that makes "absent" equal "null"

pub mod canonical;
pub mod error;
pub mod json_merge;
pub mod patcher;
pub mod schema;
pub mod strategic;

pub use canonical::{is_empty_patch, prune_map, prune_nulls};
pub use error::{MergeError, MergeResult};
pub use json_merge::{diff_objects, merge_patch, JsonMergePatcher};
pub use patcher::MergePatcher;
pub use schema::{FieldStrategy, KindSchema, PatchStrategy, Schema, SchemaRegistry};
pub use strategic::StrategicMergePatcher;
