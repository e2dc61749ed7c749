use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{OptionError, OptionResult, PipelineError};

// ---------------------------------------------------------------------------
// CalculateOption trait
// ---------------------------------------------------------------------------

/// A transform over the serialized `(current, modified)` pair.
///
/// Implementations must be pure: the output depends only on the two input
/// documents. Options are shared between concurrent calculations, hence the
/// `Send + Sync` bound.
pub trait CalculateOption: Send + Sync {
    /// Human-readable name of this option (e.g., "clean-metadata").
    fn name(&self) -> &str;

    /// Transform the pair and return the new `(current, modified)`.
    fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)>;
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run `options` left to right over the document pair.
///
/// Each option sees the output of the one before it, so the last option to
/// rewrite a field decides its final value. The first failing option aborts
/// the pipeline.
pub fn apply_options(
    options: &[Box<dyn CalculateOption>],
    mut current: Vec<u8>,
    mut modified: Vec<u8>,
) -> Result<(Vec<u8>, Vec<u8>), PipelineError> {
    for option in options {
        (current, modified) = option
            .apply(current, modified)
            .map_err(|source| PipelineError {
                option: option.name().to_string(),
                source,
            })?;
        debug!(
            option = option.name(),
            current_bytes = current.len(),
            modified_bytes = modified.len(),
            "applied calculate option"
        );
    }
    Ok((current, modified))
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

/// Decode both documents, let `edit` change them, and re-encode.
///
/// Most options are a handful of field removals on the decoded objects; this
/// does the byte handling for them.
pub fn edit_documents<F>(current: &[u8], modified: &[u8], edit: F) -> OptionResult<(Vec<u8>, Vec<u8>)>
where
    F: FnOnce(&mut Map<String, Value>, &mut Map<String, Value>),
{
    let mut current = decode(current, "current")?;
    let mut modified = decode(modified, "modified")?;
    edit(&mut current, &mut modified);
    Ok((encode(current)?, encode(modified)?))
}

fn decode(bytes: &[u8], side: &'static str) -> OptionResult<Map<String, Value>> {
    match serde_json::from_slice(bytes).map_err(|source| OptionError::Decode { side, source })? {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(OptionError::NotAnObject { side, actual: "array" }),
        Value::String(_) => Err(OptionError::NotAnObject { side, actual: "string" }),
        Value::Number(_) => Err(OptionError::NotAnObject { side, actual: "number" }),
        Value::Bool(_) => Err(OptionError::NotAnObject { side, actual: "boolean" }),
        Value::Null => Err(OptionError::NotAnObject { side, actual: "null" }),
    }
}

fn encode(map: Map<String, Value>) -> OptionResult<Vec<u8>> {
    serde_json::to_vec(&Value::Object(map)).map_err(OptionError::Encode)
}

/// Remove the field at `path` from `map`, if every parent is an object.
pub(crate) fn remove_path<S: AsRef<str>>(map: &mut Map<String, Value>, path: &[S]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut node = map;
    for segment in parents {
        node = node.get_mut(segment.as_ref())?.as_object_mut()?;
    }
    node.remove(last.as_ref())
}

/// The value at `path` in `map`.
pub(crate) fn get_path<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut node = map;
    for segment in parents {
        node = node.get(*segment)?.as_object()?;
    }
    node.get(*last)
}

/// The `kind` field of a decoded document.
pub(crate) fn kind_of(map: &Map<String, Value>) -> Option<&str> {
    map.get("kind").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Sets one top-level field on both sides.
    struct SetField {
        key: &'static str,
        value: i64,
    }

    impl CalculateOption for SetField {
        fn name(&self) -> &str {
            "set-field"
        }

        fn apply(&self, current: Vec<u8>, modified: Vec<u8>) -> OptionResult<(Vec<u8>, Vec<u8>)> {
            edit_documents(&current, &modified, |current, modified| {
                current.insert(self.key.into(), json!(self.value));
                modified.insert(self.key.into(), json!(self.value));
            })
        }
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let (current, modified) = apply_options(&[], b"{\"a\":1}".to_vec(), b"nope".to_vec()).unwrap();
        assert_eq!(current, b"{\"a\":1}".to_vec());
        assert_eq!(modified, b"nope".to_vec());
    }

    #[test]
    fn last_applied_option_wins() {
        let options: Vec<Box<dyn CalculateOption>> = vec![
            Box::new(SetField { key: "x", value: 1 }),
            Box::new(SetField { key: "x", value: 2 }),
        ];
        let (current, modified) = apply_options(&options, b"{}".to_vec(), b"{}".to_vec()).unwrap();
        assert_eq!(parse(&current), json!({"x": 2}));
        assert_eq!(parse(&modified), json!({"x": 2}));
    }

    #[test]
    fn disjoint_options_commute() {
        let a = || Box::new(SetField { key: "a", value: 1 }) as Box<dyn CalculateOption>;
        let b = || Box::new(SetField { key: "b", value: 2 }) as Box<dyn CalculateOption>;
        let forward = apply_options(&[a(), b()], b"{}".to_vec(), b"{}".to_vec()).unwrap();
        let backward = apply_options(&[b(), a()], b"{}".to_vec(), b"{}".to_vec()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn failure_names_the_option() {
        let options: Vec<Box<dyn CalculateOption>> = vec![Box::new(SetField { key: "x", value: 1 })];
        let err = apply_options(&options, b"[1]".to_vec(), b"{}".to_vec()).unwrap_err();
        assert_eq!(err.option, "set-field");
        assert!(matches!(
            err.source,
            OptionError::NotAnObject { side: "current", actual: "array" }
        ));
    }

    #[test]
    fn malformed_document_is_a_decode_error() {
        let err = edit_documents(b"{}", b"{", |_, _| {}).unwrap_err();
        assert!(matches!(err, OptionError::Decode { side: "modified", .. }));
    }

    #[test]
    fn path_helpers() {
        let mut doc = json!({"spec": {"selector": {"app": "x"}, "n": 1}, "flat": 2})
            .as_object()
            .unwrap()
            .clone();
        assert_eq!(get_path(&doc, &["spec", "n"]), Some(&json!(1)));
        assert_eq!(get_path(&doc, &["flat", "n"]), None);
        assert_eq!(remove_path(&mut doc, &["spec", "selector"]), Some(json!({"app": "x"})));
        assert_eq!(remove_path(&mut doc, &["flat", "nested"]), None);
        assert_eq!(remove_path::<&str>(&mut doc, &[]), None);
        assert_eq!(Value::Object(doc), json!({"spec": {"n": 1}, "flat": 2}));
    }
}
