/// Errors that can occur while running a calculate option.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    /// One of the documents is not valid JSON.
    #[error("failed to decode {side} document: {source}")]
    Decode {
        side: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// One of the documents is valid JSON but not an object.
    #[error("expected the {side} document to be a JSON object, got {actual}")]
    NotAnObject {
        side: &'static str,
        actual: &'static str,
    },

    /// A transformed document could not be serialized.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// A field path is empty or has an empty segment.
    #[error("invalid field path '{0}'")]
    InvalidFieldPath(String),
}

/// Convenience alias for option results.
pub type OptionResult<T> = Result<T, OptionError>;

/// An option in a pipeline failed.
#[derive(Debug, thiserror::Error)]
#[error("calculate option '{option}' failed: {source}")]
pub struct PipelineError {
    /// Name of the failing option.
    pub option: String,
    #[source]
    pub source: OptionError,
}
