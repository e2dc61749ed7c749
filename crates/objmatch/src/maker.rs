use std::fmt;
use std::sync::Arc;

use tracing::debug;

use objmatch_annotate::Annotator;
use objmatch_merge::{
    is_empty_patch, prune_nulls, JsonMergePatcher, MergeError, MergePatcher, SchemaRegistry,
    StrategicMergePatcher,
};
use objmatch_options::{apply_options, CalculateOption};
use objmatch_types::{ConfigObject, Representation, TypeMeta};

use crate::config::PatchMakerConfig;
use crate::error::{ConfigError, PatchError};
use crate::result::PatchResult;

/// Computes three-way patches between a live object and a desired one.
///
/// A `PatchMaker` is built once from an [`Annotator`] and one instance of
/// each backend, and is then shared freely: it holds no mutable state, so
/// concurrent calls on distinct objects need no coordination.
#[derive(Clone)]
pub struct PatchMaker {
    annotator: Annotator,
    structured: Arc<dyn MergePatcher>,
    generic: Arc<dyn MergePatcher>,
    default_options: Arc<[Box<dyn CalculateOption>]>,
}

impl PatchMaker {
    /// Create a patch maker from its three collaborators.
    ///
    /// `structured` serves [`Representation::Structured`] objects and
    /// `generic` serves [`Representation::Generic`] ones.
    pub fn new(
        annotator: Annotator,
        structured: Arc<dyn MergePatcher>,
        generic: Arc<dyn MergePatcher>,
    ) -> Self {
        Self {
            annotator,
            structured,
            generic,
            default_options: Arc::from(Vec::new()),
        }
    }

    /// Build a patch maker from configuration.
    ///
    /// The structured backend is a [`StrategicMergePatcher`] over the
    /// configured schemas and the configured options become the
    /// [`default_options`](Self::default_options).
    pub fn from_config(config: &PatchMakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry: SchemaRegistry = config.schemas.iter().cloned().collect();
        Ok(Self::new(
            Annotator::new(config.annotation_key.as_str()),
            Arc::new(StrategicMergePatcher::new(registry)),
            Arc::new(JsonMergePatcher),
        )
        .with_default_options(config.options.build()))
    }

    /// Replace the options used by [`calculate_with_defaults`](Self::calculate_with_defaults).
    pub fn with_default_options(mut self, options: Vec<Box<dyn CalculateOption>>) -> Self {
        self.default_options = Arc::from(options);
        self
    }

    /// The annotator that reads and refreshes last-applied snapshots.
    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Options used by [`calculate_with_defaults`](Self::calculate_with_defaults).
    pub fn default_options(&self) -> &[Box<dyn CalculateOption>] {
        &self.default_options
    }

    /// [`calculate`](Self::calculate) with the configured default options.
    pub fn calculate_with_defaults<O: ConfigObject>(
        &self,
        current: &O,
        modified: &O,
    ) -> Result<PatchResult<O>, PatchError> {
        self.calculate(current, modified, &self.default_options)
    }

    /// Compute the patch that moves `current` toward `modified`.
    ///
    /// Only fields recorded in `current`'s last-applied annotation are ever
    /// deleted, so fields added by other writers survive. `options` shape
    /// the comparison only; the returned patched object is built from the
    /// untouched serialization of `current` and carries a fresh last-applied
    /// annotation recording `modified`.
    pub fn calculate<O: ConfigObject>(
        &self,
        current: &O,
        modified: &O,
        options: &[Box<dyn CalculateOption>],
    ) -> Result<PatchResult<O>, PatchError> {
        let current_bytes = serde_json::to_vec(current).map_err(|source| PatchError::Encode {
            role: "current",
            source,
        })?;
        let pristine = current_bytes.clone();
        let modified_bytes = serde_json::to_vec(modified).map_err(|source| PatchError::Encode {
            role: "modified",
            source,
        })?;

        let (current_bytes, modified_bytes) = apply_options(options, current_bytes, modified_bytes)?;

        let current_bytes = prune_nulls(&current_bytes).map_err(|source| PatchError::Prune {
            role: "current",
            source,
        })?;
        let modified_bytes = prune_nulls(&modified_bytes).map_err(|source| PatchError::Prune {
            role: "modified",
            source,
        })?;

        // Snapshots written before pruning may still carry nulls.
        let original = self.annotator.get_original_configuration(current);
        let original = prune_nulls(&original).map_err(|source| PatchError::Prune {
            role: "original",
            source,
        })?;

        let type_meta = current.type_meta();
        let backend = self.backend_for(current.representation(), &type_meta)?;
        let fail = |stage: &'static str| {
            move |source: MergeError| PatchError::Backend {
                backend: backend.name().to_string(),
                stage,
                source,
            }
        };

        let mut patch = backend
            .create_three_way_patch(&original, &modified_bytes, &current_bytes, &type_meta)
            .map_err(fail("three-way patch"))?;

        // Directives such as list ordering can make a patch look non-empty
        // while changing nothing. Re-deriving it from its own effect on the
        // compared current collapses those.
        let effective = if is_empty_patch(&patch) {
            current_bytes.clone()
        } else {
            let three_way_len = patch.len();
            let hypothetical = backend
                .apply_patch(&current_bytes, &patch, &type_meta)
                .map_err(fail("verification apply"))?;
            patch = backend
                .create_two_way_patch(&current_bytes, &hypothetical, &type_meta)
                .map_err(fail("verification diff"))?;
            debug!(
                kind = %type_meta,
                three_way_bytes = three_way_len,
                verified_bytes = patch.len(),
                collapsed = is_empty_patch(&patch),
                "verified three-way patch"
            );
            hypothetical
        };

        let patched_bytes = if is_empty_patch(&patch) {
            pristine
        } else {
            backend
                .apply_patch(&pristine, &patch, &type_meta)
                .map_err(fail("final apply"))?
        };

        let mut patched: O = serde_json::from_slice(&patched_bytes).map_err(|source| PatchError::Decode {
            stage: "patched object",
            source,
        })?;
        self.annotator
            .set_last_applied_annotation_to_object(&mut patched, modified)
            .map_err(|source| PatchError::Annotate {
                stage: "patched object",
                source,
            })?;

        Ok(PatchResult::new(
            patch,
            current_bytes,
            modified_bytes,
            original,
            patched,
            effective,
        ))
    }

    /// The backend serving `representation`.
    fn backend_for(
        &self,
        representation: Representation,
        type_meta: &TypeMeta,
    ) -> Result<&dyn MergePatcher, PatchError> {
        let backend: &dyn MergePatcher = match representation {
            Representation::Generic => self.generic.as_ref(),
            Representation::Structured if !type_meta.is_empty() => self.structured.as_ref(),
            representation => {
                return Err(PatchError::UnrecognizedObject {
                    representation,
                    type_meta: type_meta.clone(),
                })
            }
        };
        debug!(
            backend = backend.name(),
            %representation,
            kind = %type_meta,
            "selected merge backend"
        );
        Ok(backend)
    }
}

impl Default for PatchMaker {
    /// Default annotator, a strategic backend with no registered schemas and
    /// the JSON merge backend.
    fn default() -> Self {
        Self::new(
            Annotator::default(),
            Arc::new(StrategicMergePatcher::default()),
            Arc::new(JsonMergePatcher),
        )
    }
}

impl fmt::Debug for PatchMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchMaker")
            .field("annotator", &self.annotator)
            .field("structured", &self.structured.name())
            .field("generic", &self.generic.name())
            .field(
                "default_options",
                &self.default_options.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
