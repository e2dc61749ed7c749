//! Schemaless configuration objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_type_name, TypeError, TypeResult};
use crate::meta::TypeMeta;
use crate::object::{Annotations, ConfigObject, Representation};

/// A configuration object held as an arbitrary JSON mapping.
///
/// Type metadata is read from the object's own `apiVersion` and `kind`
/// fields; annotations live under `metadata.annotations`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicObject {
    fields: Map<String, Value>,
}

impl DynamicObject {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> TypeResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(TypeError::NotAnObject(json_type_name(&other).to_string())),
        }
    }

    /// Parse a JSON document, which must be an object.
    pub fn from_json(bytes: &[u8]) -> TypeResult<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    /// The top-level fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Mutable access to the top-level fields.
    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Consume the object and return it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Look up a nested field by its key path.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }
}

impl From<Map<String, Value>> for DynamicObject {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl Annotations for DynamicObject {
    fn annotation(&self, key: &str) -> Option<&str> {
        self.fields
            .get("metadata")?
            .get("annotations")?
            .get(key)?
            .as_str()
    }

    fn set_annotation(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                let metadata = ensure_object(
                    self.fields
                        .entry("metadata")
                        .or_insert_with(|| Value::Object(Map::new())),
                );
                let annotations = ensure_object(
                    metadata
                        .entry("annotations")
                        .or_insert_with(|| Value::Object(Map::new())),
                );
                annotations.insert(key.to_string(), Value::String(value));
            }
            None => {
                let Some(Value::Object(metadata)) = self.fields.get_mut("metadata") else {
                    return;
                };
                let emptied = match metadata.get_mut("annotations") {
                    Some(Value::Object(annotations)) => {
                        annotations.remove(key);
                        annotations.is_empty()
                    }
                    _ => false,
                };
                if emptied {
                    metadata.remove("annotations");
                }
            }
        }
    }
}

impl ConfigObject for DynamicObject {
    fn representation(&self) -> Representation {
        Representation::Generic
    }

    fn type_meta(&self) -> TypeMeta {
        let field = |name: &str| {
            self.fields
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        TypeMeta::new(field("apiVersion"), field("kind"))
    }
}

/// Replace `slot` with an empty object unless it already is one.
fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    match slot {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            ensure_object(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> DynamicObject {
        DynamicObject::from_value(value).unwrap()
    }

    #[test]
    fn rejects_non_object_values() {
        let err = DynamicObject::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err, TypeError::NotAnObject("array".into()));
        assert!(DynamicObject::from_json(b"not json").is_err());
    }

    #[test]
    fn type_meta_from_fields() {
        let obj = object(json!({"apiVersion": "v1", "kind": "ConfigMap"}));
        assert_eq!(obj.type_meta(), TypeMeta::new("v1", "ConfigMap"));
        assert_eq!(obj.representation(), Representation::Generic);
        assert!(DynamicObject::new().type_meta().is_empty());
    }

    #[test]
    fn set_annotation_creates_metadata() {
        let mut obj = DynamicObject::new();
        obj.set_annotation("k", Some("v".into()));
        assert_eq!(obj.annotation("k"), Some("v"));
        assert_eq!(obj.into_value(), json!({"metadata": {"annotations": {"k": "v"}}}));
    }

    #[test]
    fn set_annotation_replaces_non_object_metadata() {
        let mut obj = object(json!({"metadata": "bogus"}));
        obj.set_annotation("k", Some("v".into()));
        assert_eq!(obj.get(&["metadata", "annotations", "k"]), Some(&json!("v")));
    }

    #[test]
    fn removing_last_annotation_drops_container() {
        let mut obj = object(json!({"metadata": {"name": "x", "annotations": {"k": "v"}}}));
        obj.set_annotation("k", None);
        assert_eq!(obj.into_value(), json!({"metadata": {"name": "x"}}));
    }

    #[test]
    fn removing_missing_annotation_is_noop() {
        let mut obj = object(json!({"metadata": {"annotations": {"other": "v"}}}));
        obj.set_annotation("k", None);
        assert_eq!(obj.annotation("other"), Some("v"));

        let mut bare = DynamicObject::new();
        bare.set_annotation("k", None);
        assert_eq!(bare, DynamicObject::new());
    }

    #[test]
    fn nested_get() {
        let obj = object(json!({"spec": {"selector": {"app": "web"}}}));
        assert_eq!(obj.get(&["spec", "selector", "app"]), Some(&json!("web")));
        assert_eq!(obj.get(&["spec", "missing"]), None);
        assert_eq!(obj.get(&[]), None);
    }
}
