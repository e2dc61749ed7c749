//! Three-way merge patches for configuration objects.
//!
//! Given the live state of an object and the configuration a caller now
//! wants, [`PatchMaker::calculate`] returns the smallest patch that changes
//! exactly the fields the caller owns. Ownership is tracked through a
//! last-applied annotation on the object, so fields set by other writers are
//! never deleted, and serialization noise (explicit nulls, store-managed
//! metadata, list ordering hints) never shows up as a difference.
//!
//! # Quick Start
//!
//! ```rust
//! use objmatch::{PatchMaker, clean_metadata};
//! use objmatch_types::DynamicObject;
//! use serde_json::json;
//!
//! let maker = PatchMaker::default();
//! let current = DynamicObject::from_value(json!({
//!     "apiVersion": "v1",
//!     "kind": "ConfigMap",
//!     "metadata": {"name": "settings", "uid": "42"},
//!     "data": {"mode": "fast"}
//! }))
//! .unwrap();
//! let modified = DynamicObject::from_value(json!({
//!     "apiVersion": "v1",
//!     "kind": "ConfigMap",
//!     "metadata": {"name": "settings"},
//!     "data": {"mode": "safe"}
//! }))
//! .unwrap();
//!
//! let result = maker.calculate(&current, &modified, &[clean_metadata()]).unwrap();
//! assert_eq!(result.patch, br#"{"data":{"mode":"safe"}}"#.to_vec());
//! ```
//!
//! # Key Types
//!
//! - [`PatchMaker`] -- Computes patches; built from an annotator and two backends
//! - [`PatchResult`] -- Patch plus the documents it was computed from
//! - [`PatchMakerConfig`] -- TOML-loadable annotation key, options and schemas
//! - [`PatchError`] / [`ConfigError`] -- Failures, each naming its stage

pub mod config;
pub mod error;
pub mod maker;
pub mod result;

pub use config::PatchMakerConfig;
pub use error::{ConfigError, PatchError};
pub use maker::PatchMaker;
pub use result::PatchResult;

// Re-exports for convenience.
pub use objmatch_annotate::{Annotator, DEFAULT_ANNOTATION_KEY};
pub use objmatch_merge::{
    FieldStrategy, JsonMergePatcher, KindSchema, MergePatcher, Schema, SchemaRegistry,
    StrategicMergePatcher,
};
pub use objmatch_options::{
    clean_metadata, ignore_field, ignore_pdb_selector, ignore_status_fields,
    ignore_volume_claim_template_type_meta_and_status, CalculateOption, OptionsConfig,
};
pub use objmatch_types::{ConfigObject, DynamicObject, Kind, ObjectMeta, Representation, Resource, TypeMeta};
