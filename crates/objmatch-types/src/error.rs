use thiserror::Error;

/// Errors produced by object model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A dynamic object must be a JSON object at the top level.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for object model operations.
pub type TypeResult<T> = Result<T, TypeError>;

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
