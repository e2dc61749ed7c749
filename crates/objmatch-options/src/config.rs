use serde::{Deserialize, Serialize};

use crate::error::OptionResult;
use crate::option::CalculateOption;
use crate::options::{
    CleanMetadata, IgnoreField, IgnorePdbSelector, IgnoreStatusFields,
    IgnoreVolumeClaimTemplateTypeMetaAndStatus,
};

/// Declarative selection of the built-in calculate options.
///
/// [`build`](Self::build) always orders the options the same way: metadata
/// cleanup, status, pod disruption budget selectors, volume claim templates,
/// then each ignored field in the listed order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Strip store-managed metadata and `status`.
    pub clean_metadata: bool,
    /// Strip `status`.
    pub ignore_status_fields: bool,
    /// Strip equal pod disruption budget selectors.
    pub ignore_pdb_selector: bool,
    /// Strip type metadata and status from volume claim templates.
    pub ignore_volume_claim_template_type_meta_and_status: bool,
    /// Dotted field paths excluded from comparison.
    pub ignore_fields: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            clean_metadata: true,
            ignore_status_fields: false,
            ignore_pdb_selector: false,
            ignore_volume_claim_template_type_meta_and_status: false,
            ignore_fields: Vec::new(),
        }
    }
}

impl OptionsConfig {
    /// A configuration with every option switched off.
    pub fn none() -> Self {
        Self {
            clean_metadata: false,
            ..Default::default()
        }
    }

    /// Check every ignored field path.
    pub fn validate(&self) -> OptionResult<()> {
        self.ignore_fields
            .iter()
            .try_for_each(|path| IgnoreField::new(path.as_str()).validate())
    }

    /// The selected options, in pipeline order.
    pub fn build(&self) -> Vec<Box<dyn CalculateOption>> {
        let mut options: Vec<Box<dyn CalculateOption>> = Vec::new();
        if self.clean_metadata {
            options.push(Box::new(CleanMetadata));
        }
        if self.ignore_status_fields {
            options.push(Box::new(IgnoreStatusFields));
        }
        if self.ignore_pdb_selector {
            options.push(Box::new(IgnorePdbSelector));
        }
        if self.ignore_volume_claim_template_type_meta_and_status {
            options.push(Box::new(IgnoreVolumeClaimTemplateTypeMetaAndStatus));
        }
        for path in &self.ignore_fields {
            options.push(Box::new(IgnoreField::new(path.as_str())));
        }
        options
    }
}
