/// Errors that can occur while reading or writing the last-applied annotation.
#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    /// The object could not be serialized into a snapshot.
    #[error("failed to serialize object for annotation: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A snapshot handed to the annotator was not valid UTF-8.
    #[error("annotation value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Convenience alias for annotator results.
pub type AnnotateResult<T> = Result<T, AnnotateError>;
