use crate::error::{OptionError, OptionResult};
use crate::option::{edit_documents, remove_path, CalculateOption};

/// Removes one dotted field path from both sides, whatever its value.
///
/// Use it for a field that must never be considered for ownership, even
/// when the two sides disagree on it. `spec.replicas` of a workload managed
/// by an autoscaler is the usual example.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreField {
    name: String,
    path: Vec<String>,
}

impl IgnoreField {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: format!("ignore-field({path})"),
            path: path.split('.').map(str::to_owned).collect(),
        }
    }

    /// Returns an error if the path is empty or has an empty segment.
    pub fn validate(&self) -> OptionResult<()> {
        if self.path.iter().any(String::is_empty) {
            return Err(OptionError::InvalidFieldPath(self.path.join(".")));
        }
        Ok(())
    }
}

impl CalculateOption for IgnoreField {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
        self.validate()?;
        edit_documents(&current, &modified, |current, modified| {
            remove_path(current, &self.path);
            remove_path(modified, &self.path);
        })
    }
}
