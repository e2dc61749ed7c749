//! Error types for patch calculation and configuration.

use objmatch_annotate::AnnotateError;
use objmatch_merge::MergeError;
use objmatch_options::{OptionError, PipelineError};
use objmatch_types::{Representation, TypeMeta};

/// Errors that abort a patch calculation.
///
/// Every variant names the stage that failed. No partial result is ever
/// returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// An input object could not be serialized.
    #[error("failed to encode {role} object: {source}")]
    Encode {
        role: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Patched bytes could not be decoded back into the object type.
    #[error("failed to decode {stage}: {source}")]
    Decode {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A calculate option rejected its input.
    #[error(transparent)]
    Option(#[from] PipelineError),

    /// Null pruning failed on a serialized object.
    #[error("failed to prune nulls from {role} object: {source}")]
    Prune {
        role: &'static str,
        #[source]
        source: MergeError,
    },

    /// The merge backend rejected its input.
    #[error("{backend} backend failed during {stage}: {source}")]
    Backend {
        backend: String,
        stage: &'static str,
        #[source]
        source: MergeError,
    },

    /// The last-applied annotation could not be written.
    #[error("failed to annotate {stage}: {source}")]
    Annotate {
        stage: &'static str,
        #[source]
        source: AnnotateError,
    },

    /// The object's representation has no backend. This is a programming
    /// error in the object type, not a data error.
    #[error("no merge backend for {representation} object of kind {type_meta}")]
    UnrecognizedObject {
        representation: Representation,
        type_meta: TypeMeta,
    },
}

/// Errors in a [`PatchMakerConfig`](crate::PatchMakerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The annotation key is empty or contains whitespace.
    #[error("invalid annotation key '{0}'")]
    InvalidAnnotationKey(String),

    /// An option setting is invalid.
    #[error("invalid option configuration: {0}")]
    Options(#[from] OptionError),

    /// A schema entry is invalid.
    #[error("invalid schema for kind '{kind}': {reason}")]
    InvalidSchema { kind: String, reason: String },
}
