use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API version and kind of an object.
///
/// Both fields are omitted from the serialized form when empty, so a typed
/// object that never set them serializes without `apiVersion`/`kind`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// Returns `true` if no kind is known.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }
}

impl fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.api_version.is_empty(), self.kind.is_empty()) {
            (_, true) => write!(f, "<unknown kind>"),
            (true, false) => write!(f, "{}", self.kind),
            (false, false) => write!(f, "{}/{}", self.api_version, self.kind),
        }
    }
}

/// Standard object metadata.
///
/// Besides the caller-owned fields (name, labels, annotations, ...) this
/// carries the fields the store manages on its own. `creation_timestamp` is
/// always serialized, as `null` when unset, the same way typed encoders emit
/// zero-valued timestamps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,

    // Store-managed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default)]
    pub creation_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_fields: Vec<Value>,
}

impl ObjectMeta {
    /// Metadata with just a name and namespace.
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Builder-style label insertion.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_meta_display() {
        assert_eq!(TypeMeta::new("v1", "Service").to_string(), "v1/Service");
        assert_eq!(TypeMeta::new("", "Service").to_string(), "Service");
        assert_eq!(TypeMeta::default().to_string(), "<unknown kind>");
    }

    #[test]
    fn empty_type_meta_is_omitted() {
        let value = serde_json::to_value(TypeMeta::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn object_meta_emits_null_creation_timestamp() {
        let value = serde_json::to_value(ObjectMeta::named("svc", "default")).unwrap();
        assert_eq!(
            value,
            json!({"name": "svc", "namespace": "default", "creationTimestamp": null})
        );
    }

    #[test]
    fn object_meta_round_trips_store_fields() {
        let input = json!({
            "name": "svc",
            "uid": "1234",
            "resourceVersion": "42",
            "generation": 3,
            "creationTimestamp": "2024-01-01T00:00:00Z",
            "labels": {"app": "web"}
        });
        let meta: ObjectMeta = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(meta.uid.as_deref(), Some("1234"));
        assert_eq!(meta.generation, Some(3));
        assert_eq!(meta.labels.get("app").map(String::as_str), Some("web"));
        assert_eq!(serde_json::to_value(&meta).unwrap(), input);
    }
}
