//! Calculate options for objmatch.
//!
//! An option is a pure transform over the serialized `(current, modified)`
//! pair that runs before any diffing. Options exist to take fields out of the
//! comparison: whatever an option removes can never show up in a patch, but
//! it is still present on the live object the patch is finally applied to.
//!
//! Options run left to right, each seeing the previous option's output. When
//! two options rewrite the same field, the one applied last wins.
//!
//! # Key Types
//!
//! - [`CalculateOption`] -- A single transform over the document pair
//! - [`apply_options`] -- Runs a list of options in order
//! - [`OptionsConfig`] -- Declarative selection of the built-in options
//!
//! # Quick Start
//!
//! ```rust
//! use objmatch_options::{apply_options, clean_metadata, ignore_field};
//!
//! let options = vec![clean_metadata(), ignore_field("spec.replicas")];
//! let current = br#"{"metadata":{"uid":"1"},"spec":{"replicas":3}}"#.to_vec();
//! let modified = br#"{"spec":{"replicas":1}}"#.to_vec();
//! let (current, modified) = apply_options(&options, current, modified).unwrap();
//! assert_eq!(current, br#"{"metadata":{},"spec":{}}"#.to_vec());
//! assert_eq!(modified, br#"{"spec":{}}"#.to_vec());
//! ```

pub mod config;
pub mod error;
pub mod option;
pub mod options;

pub use config::OptionsConfig;
pub use error::{OptionError, OptionResult, PipelineError};
pub use option::{apply_options, edit_documents, CalculateOption};
pub use options::{
    clean_metadata, ignore_field, ignore_pdb_selector, ignore_status_fields,
    ignore_volume_claim_template_type_meta_and_status, CleanMetadata, IgnoreField,
    IgnorePdbSelector, IgnoreStatusFields, IgnoreVolumeClaimTemplateTypeMetaAndStatus,
};
