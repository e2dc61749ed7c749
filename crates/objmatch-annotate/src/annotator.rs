use objmatch_merge::prune_map;
use objmatch_types::ConfigObject;
use serde_json::Value;
use tracing::trace;

use crate::error::AnnotateResult;

/// Annotation key used when none is configured.
pub const DEFAULT_ANNOTATION_KEY: &str = "objmatch.dev/last-applied";

/// Original configuration reported for objects that were never annotated.
const EMPTY_CONFIGURATION: &[u8] = b"{}";

/// Reads and writes the last-applied configuration of an object.
///
/// The snapshot is the compact JSON serialization of the object with the
/// annotation itself removed, so a snapshot never contains an older snapshot.
/// An `Annotator` holds only its key and is freely shared between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotator {
    key: String,
}

impl Annotator {
    /// Annotator storing snapshots under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored snapshot, or `{}` if the object carries none.
    pub fn get_original_configuration<O: ConfigObject>(&self, object: &O) -> Vec<u8> {
        match object.annotation(&self.key) {
            Some(value) => value.as_bytes().to_vec(),
            None => EMPTY_CONFIGURATION.to_vec(),
        }
    }

    /// Serialize a copy of `object` without the last-applied annotation.
    ///
    /// Null-valued keys are pruned: a snapshot records only fields the
    /// caller actually set, so encoder placeholders are never mistaken for
    /// owned fields on a later deletion pass.
    pub fn get_modified_configuration<O: ConfigObject>(&self, object: &O) -> AnnotateResult<Vec<u8>> {
        let mut copy = object.clone();
        copy.set_annotation(&self.key, None);
        let snapshot = match serde_json::to_value(&copy)? {
            Value::Object(map) => Value::Object(prune_map(map)),
            other => other,
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }

    /// Store the object's own configuration as its last-applied snapshot.
    ///
    /// Idempotent: the existing snapshot is excluded before serializing, so
    /// running this twice stores the same value.
    pub fn set_last_applied_annotation<O: ConfigObject>(&self, object: &mut O) -> AnnotateResult<()> {
        let snapshot = self.get_modified_configuration(object)?;
        self.set_original_configuration(object, snapshot)
    }

    /// Store the configuration of `source` as the snapshot of `target`.
    ///
    /// The patch maker uses this to record the desired object on the patched
    /// one, whatever actually landed in `target`.
    pub fn set_last_applied_annotation_to_object<T, S>(&self, target: &mut T, source: &S) -> AnnotateResult<()>
    where
        T: ConfigObject,
        S: ConfigObject,
    {
        let snapshot = self.get_modified_configuration(source)?;
        self.set_original_configuration(target, snapshot)
    }

    /// Store an arbitrary snapshot on `object`.
    pub fn set_original_configuration<O: ConfigObject>(
        &self,
        object: &mut O,
        snapshot: Vec<u8>,
    ) -> AnnotateResult<()> {
        let value = String::from_utf8(snapshot)?;
        trace!(key = %self.key, bytes = value.len(), "storing last-applied configuration");
        object.set_annotation(&self.key, Some(value));
        Ok(())
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOTATION_KEY)
    }
}
