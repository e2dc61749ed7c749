use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::meta::{ObjectMeta, TypeMeta};

// ---------------------------------------------------------------------------
// Representation
// ---------------------------------------------------------------------------

/// How a configuration object is represented.
///
/// The patch maker selects its merge backend from this tag exactly once per
/// call. Structured objects have a known schema and support merge-key aware
/// list semantics; generic objects are arbitrary mappings and only support
/// wholesale list replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Representation {
    /// Known schema, typed field access.
    Structured,
    /// Schemaless nested mapping.
    Generic,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Read/write access to an object's string annotations.
///
/// This is the only way the annotator touches an object, which keeps the
/// last-applied memory separate from the object's substantive fields.
pub trait Annotations {
    /// The value stored under `key`, if any.
    fn annotation(&self, key: &str) -> Option<&str>;

    /// Store `value` under `key`; `None` removes the key.
    ///
    /// Implementations drop the annotation container entirely once it is
    /// empty, so that removing the last annotation yields the same
    /// serialization as never having had one.
    fn set_annotation(&mut self, key: &str, value: Option<String>);
}

// ---------------------------------------------------------------------------
// ConfigObject
// ---------------------------------------------------------------------------

/// A configuration object the patch maker can compare and reconstruct.
///
/// Decoding a patched document back into the concrete type goes through
/// [`DeserializeOwned`], so each implementing type is its own factory.
pub trait ConfigObject: Annotations + Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Which merge backend applies to this object.
    fn representation(&self) -> Representation;

    /// API version and kind, used to look up the object's merge schema.
    fn type_meta(&self) -> TypeMeta;
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// The spec half of a strongly-typed resource.
///
/// The type-level constants identify the kind even when the serialized object
/// omits `apiVersion` and `kind`.
pub trait Kind: Serialize + DeserializeOwned + Clone + Default + Send + Sync {
    const API_VERSION: &'static str;
    const KIND: &'static str;
}

/// A strongly-typed configuration object.
///
/// The layout follows the usual `apiVersion`/`kind`/`metadata`/`spec`/`status`
/// shape. `status` is kept untyped because it is owned by the store, never
/// by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource<S> {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl<S: Kind> Resource<S> {
    /// A resource with the given metadata and spec and no type metadata set.
    pub fn new(metadata: ObjectMeta, spec: S) -> Self {
        Self {
            type_meta: TypeMeta::default(),
            metadata,
            spec,
            status: None,
        }
    }

    /// Fill in `apiVersion` and `kind` from the spec type.
    pub fn with_type_meta(mut self) -> Self {
        self.type_meta = TypeMeta::new(S::API_VERSION, S::KIND);
        self
    }
}

impl<S: Kind> Annotations for Resource<S> {
    fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    fn set_annotation(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.metadata.annotations.insert(key.to_string(), value);
            }
            None => {
                self.metadata.annotations.remove(key);
            }
        }
    }
}

impl<S: Kind> ConfigObject for Resource<S> {
    fn representation(&self) -> Representation {
        Representation::Structured
    }

    fn type_meta(&self) -> TypeMeta {
        TypeMeta::new(S::API_VERSION, S::KIND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct WidgetSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replicas: Option<u32>,
    }

    impl Kind for WidgetSpec {
        const API_VERSION: &'static str = "example.dev/v1";
        const KIND: &'static str = "Widget";
    }

    #[test]
    fn type_meta_comes_from_kind_constants() {
        let widget = Resource::new(ObjectMeta::named("w", "default"), WidgetSpec::default());
        assert_eq!(widget.type_meta(), TypeMeta::new("example.dev/v1", "Widget"));
        assert_eq!(widget.representation(), Representation::Structured);
    }

    #[test]
    fn type_meta_is_only_serialized_when_set() {
        let widget = Resource::new(ObjectMeta::named("w", ""), WidgetSpec::default());
        let value = serde_json::to_value(&widget).unwrap();
        assert!(value.get("kind").is_none());

        let value = serde_json::to_value(widget.with_type_meta()).unwrap();
        assert_eq!(value["kind"], json!("Widget"));
        assert_eq!(value["apiVersion"], json!("example.dev/v1"));
    }

    #[test]
    fn removing_last_annotation_matches_unannotated_serialization() {
        let plain = Resource::new(ObjectMeta::named("w", ""), WidgetSpec::default());
        let mut annotated = plain.clone();
        annotated.set_annotation("a", Some("b".into()));
        assert_eq!(annotated.annotation("a"), Some("b"));

        annotated.set_annotation("a", None);
        assert_eq!(
            serde_json::to_vec(&annotated).unwrap(),
            serde_json::to_vec(&plain).unwrap()
        );
    }

    #[test]
    fn deserializes_without_spec_or_status() {
        let widget: Resource<WidgetSpec> =
            serde_json::from_value(json!({"metadata": {"name": "w"}})).unwrap();
        assert_eq!(widget.metadata.name, "w");
        assert_eq!(widget.spec, WidgetSpec::default());
        assert!(widget.status.is_none());
    }
}
