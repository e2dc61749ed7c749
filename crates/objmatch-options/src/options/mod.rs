//! Built-in calculate options.

pub mod field;
pub mod metadata;
pub mod pdb;
pub mod stateful_set;

pub use field::IgnoreField;
pub use metadata::{CleanMetadata, IgnoreStatusFields};
pub use pdb::IgnorePdbSelector;
pub use stateful_set::IgnoreVolumeClaimTemplateTypeMetaAndStatus;

use crate::option::CalculateOption;

/// Strip store-managed metadata and `status` from both sides.
pub fn clean_metadata() -> Box<dyn CalculateOption> {
    Box::new(CleanMetadata)
}

/// Strip `status` from both sides.
pub fn ignore_status_fields() -> Box<dyn CalculateOption> {
    Box::new(IgnoreStatusFields)
}

/// Strip the dotted `path` from both sides, whatever its value.
pub fn ignore_field(path: impl Into<String>) -> Box<dyn CalculateOption> {
    Box::new(IgnoreField::new(path))
}

/// Strip equal `spec.selector`s of pod disruption budgets.
pub fn ignore_pdb_selector() -> Box<dyn CalculateOption> {
    Box::new(IgnorePdbSelector)
}

/// Strip `apiVersion`, `kind` and `status` from stateful set volume claim
/// templates.
pub fn ignore_volume_claim_template_type_meta_and_status() -> Box<dyn CalculateOption> {
    Box::new(IgnoreVolumeClaimTemplateTypeMetaAndStatus)
}
