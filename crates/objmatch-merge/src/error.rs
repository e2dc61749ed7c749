//! Error types for the merge crate.

/// Errors that can occur while computing or applying a merge patch.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Input bytes are not valid JSON.
    #[error("invalid JSON document: {0}")]
    Decode(#[source] serde_json::Error),

    /// A computed document could not be serialized.
    #[error("failed to encode JSON document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The document was valid JSON but not an object.
    #[error("expected the {role} to be a JSON object, got {actual}")]
    NotAnObject {
        role: &'static str,
        actual: &'static str,
    },

    /// A structured object carried no kind, so its schema cannot be resolved.
    #[error("structured object has no kind; cannot resolve its merge schema")]
    MissingTypeMeta,

    /// An item of a merge-keyed list does not carry the merge key.
    #[error("list item under '{path}' is missing merge key '{key}'")]
    MissingMergeKey { path: String, key: String },

    /// A patch directive was malformed.
    #[error("invalid patch directive at '{path}': {reason}")]
    InvalidDirective { path: String, reason: String },
}

impl MergeError {
    pub(crate) fn directive(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDirective {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
