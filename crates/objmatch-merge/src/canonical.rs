//! Canonicalization of serialized objects.
//!
//! Encoders re-introduce explicit `null` for zero-valued fields, which would
//! otherwise show up as spurious differences against a document that simply
//! omits them. Pruning makes "absent" and "explicitly null" compare equal.
//! It works purely on the JSON tree and never consults a schema.

use serde_json::{Map, Value};

use crate::error::{MergeError, MergeResult};

/// Remove every null-valued key from a serialized JSON object.
///
/// Pruning recurses through nested objects but not through arrays. A nested
/// object that becomes empty because all its keys were null is dropped; a
/// nested object that was empty to begin with is kept.
pub fn prune_nulls(document: &[u8]) -> MergeResult<Vec<u8>> {
    let object = decode_object(document, "document")?;
    encode(&Value::Object(prune_map(object)))
}

/// Tree-level counterpart of [`prune_nulls`].
pub fn prune_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut pruned = Map::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Object(inner) if inner.is_empty() => {
                pruned.insert(key, Value::Object(inner));
            }
            Value::Object(inner) => {
                let inner = prune_map(inner);
                if !inner.is_empty() {
                    pruned.insert(key, Value::Object(inner));
                }
            }
            other => {
                pruned.insert(key, other);
            }
        }
    }
    pruned
}

/// Returns `true` if `patch` is the empty object document `{}`.
pub fn is_empty_patch(patch: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<Value>(patch),
        Ok(Value::Object(map)) if map.is_empty()
    )
}

/// Decode `bytes` as a JSON object. `role` names the document in errors.
pub(crate) fn decode_object(bytes: &[u8], role: &'static str) -> MergeResult<Map<String, Value>> {
    match serde_json::from_slice(bytes).map_err(MergeError::Decode)? {
        Value::Object(map) => Ok(map),
        other => Err(MergeError::NotAnObject {
            role,
            actual: json_type_name(&other),
        }),
    }
}

pub(crate) fn encode(value: &Value) -> MergeResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(MergeError::Encode)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn prune(value: Value) -> Value {
        let bytes = serde_json::to_vec(&value).unwrap();
        serde_json::from_slice(&prune_nulls(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn removes_top_level_nulls() {
        assert_eq!(prune(json!({"a": null, "b": 1})), json!({"b": 1}));
    }

    #[test]
    fn removes_nested_nulls() {
        let input = json!({"metadata": {"name": "x", "creationTimestamp": null}});
        assert_eq!(prune(input), json!({"metadata": {"name": "x"}}));
    }

    #[test]
    fn drops_objects_emptied_by_pruning() {
        let input = json!({"status": {"loadBalancer": {"ingress": null}}, "a": 1});
        assert_eq!(prune(input), json!({"a": 1}));
    }

    #[test]
    fn keeps_originally_empty_objects() {
        let input = json!({"spec": {}, "a": null});
        assert_eq!(prune(input), json!({"spec": {}}));
    }

    #[test]
    fn does_not_descend_into_arrays() {
        let input = json!({"items": [null, {"a": null}]});
        assert_eq!(prune(input.clone()), input);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(prune_nulls(b"{"), Err(MergeError::Decode(_))));
        assert!(matches!(
            prune_nulls(b"[1]"),
            Err(MergeError::NotAnObject { actual: "array", .. })
        ));
    }

    #[test]
    fn empty_patch_detection() {
        assert!(is_empty_patch(b"{}"));
        assert!(is_empty_patch(b" { } "));
        assert!(!is_empty_patch(b"{\"a\":null}"));
        assert!(!is_empty_patch(b"[]"));
        assert!(!is_empty_patch(b"garbage"));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-e]", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-e]", arb_json(), 0..6).prop_map(|m| m.into_iter().collect())
    }

    /// Paths to every value pruning must preserve.
    fn kept_leaves(map: &Map<String, Value>, prefix: &[String], out: &mut Vec<(Vec<String>, Value)>) {
        for (key, value) in map {
            let mut path = prefix.to_vec();
            path.push(key.clone());
            match value {
                Value::Null => {}
                Value::Object(inner) if !inner.is_empty() => kept_leaves(inner, &path, out),
                other => out.push((path, other.clone())),
            }
        }
    }

    fn lookup<'a>(map: &'a Map<String, Value>, path: &[String]) -> Option<&'a Value> {
        let (first, rest) = path.split_first()?;
        let mut current = map.get(first)?;
        for key in rest {
            current = current.as_object()?.get(key)?;
        }
        Some(current)
    }

    proptest! {
        #[test]
        fn prune_is_idempotent(object in arb_object()) {
            let once = prune_map(object);
            let twice = prune_map(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prune_keeps_every_non_null_leaf(object in arb_object()) {
            let mut leaves = Vec::new();
            kept_leaves(&object, &[], &mut leaves);
            let pruned = prune_map(object);
            for (path, value) in leaves {
                prop_assert_eq!(lookup(&pruned, &path), Some(&value));
            }
        }
    }
}
