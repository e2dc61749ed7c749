//! Per-kind merge metadata for the strategic backend.
//!
//! A [`Schema`] maps dotted field paths to the strategy used for list fields
//! at that path. Paths are made of object keys only; entering a list element
//! does not add a segment, so the ports of a service are `spec.ports` and the
//! container ports of a pod template are
//! `spec.template.spec.containers.ports`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use objmatch_types::TypeMeta;

/// How a list field is patched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStrategy {
    /// The whole list is replaced whenever it differs.
    #[default]
    Replace,
    /// Items are merged: by merge key for lists of objects, as a set for
    /// lists of primitives.
    Merge,
}

/// Patch metadata for one field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStrategy {
    #[serde(default)]
    pub strategy: PatchStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_key: Option<String>,
}

impl FieldStrategy {
    /// Merge a list of objects by `merge_key`.
    pub fn merge_by(merge_key: impl Into<String>) -> Self {
        Self {
            strategy: PatchStrategy::Merge,
            merge_key: Some(merge_key.into()),
        }
    }

    /// Merge a list as a set of values.
    pub fn merge_set() -> Self {
        Self {
            strategy: PatchStrategy::Merge,
            merge_key: None,
        }
    }

    pub fn is_merge(&self) -> bool {
        self.strategy == PatchStrategy::Merge
    }
}

/// Merge metadata for one kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldStrategy>,
}

/// Schema used for kinds nobody registered: every list is replaced.
pub(crate) static EMPTY_SCHEMA: Schema = Schema {
    fields: BTreeMap::new(),
};

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field registration.
    pub fn with_field(mut self, path: impl Into<String>, strategy: FieldStrategy) -> Self {
        self.fields.insert(path.into(), strategy);
        self
    }

    /// Strategy declared for `path`, if it merges rather than replaces.
    pub fn merge_strategy(&self, path: &str) -> Option<&FieldStrategy> {
        self.fields.get(path).filter(|field| field.is_merge())
    }
}

/// A schema together with the kind it belongs to, as it appears in
/// configuration files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSchema {
    #[serde(default)]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldStrategy>,
}

/// Lookup table from kind to schema.
///
/// A schema registered with an empty API version matches its kind in every
/// version; an exact `(apiVersion, kind)` registration takes precedence.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeMeta, Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the schema for a kind.
    pub fn register(&mut self, type_meta: TypeMeta, schema: Schema) {
        self.schemas.insert(type_meta, schema);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, type_meta: TypeMeta, schema: Schema) -> Self {
        self.register(type_meta, schema);
        self
    }

    /// The schema for `type_meta`, if one was registered.
    pub fn get(&self, type_meta: &TypeMeta) -> Option<&Schema> {
        self.schemas.get(type_meta).or_else(|| {
            self.schemas
                .get(&TypeMeta::new("", type_meta.kind.clone()))
        })
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl FromIterator<KindSchema> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = KindSchema>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.register(
                TypeMeta::new(entry.api_version, entry.kind),
                Schema {
                    fields: entry.fields,
                },
            );
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_schema() -> Schema {
        Schema::new().with_field("spec.ports", FieldStrategy::merge_by("port"))
    }

    #[test]
    fn exact_registration_wins() {
        let registry = SchemaRegistry::new()
            .with(TypeMeta::new("", "Service"), Schema::new())
            .with(TypeMeta::new("v1", "Service"), service_schema());
        let schema = registry.get(&TypeMeta::new("v1", "Service")).unwrap();
        assert!(schema.merge_strategy("spec.ports").is_some());
    }

    #[test]
    fn versionless_registration_matches_any_version() {
        let registry = SchemaRegistry::new().with(TypeMeta::new("", "Service"), service_schema());
        assert!(registry.get(&TypeMeta::new("v2", "Service")).is_some());
        assert!(registry.get(&TypeMeta::new("v1", "Pod")).is_none());
    }

    #[test]
    fn replace_fields_are_not_merge_strategies() {
        let schema = Schema::new().with_field("spec.items", FieldStrategy::default());
        assert!(schema.merge_strategy("spec.items").is_none());
        assert!(schema.merge_strategy("spec.unknown").is_none());
    }

    #[test]
    fn registry_from_kind_schemas() {
        let registry: SchemaRegistry = vec![KindSchema {
            api_version: "apps/v1".into(),
            kind: "Deployment".into(),
            fields: [(
                "spec.template.spec.containers".to_string(),
                FieldStrategy::merge_by("name"),
            )]
            .into_iter()
            .collect(),
        }]
        .into_iter()
        .collect();
        assert_eq!(registry.len(), 1);
        let schema = registry.get(&TypeMeta::new("apps/v1", "Deployment")).unwrap();
        assert_eq!(
            schema
                .merge_strategy("spec.template.spec.containers")
                .and_then(|f| f.merge_key.as_deref()),
            Some("name")
        );
    }

    #[test]
    fn field_strategy_deserializes_from_camel_case() {
        let field: FieldStrategy =
            serde_json::from_str(r#"{"strategy":"merge","mergeKey":"port"}"#).unwrap();
        assert_eq!(field, FieldStrategy::merge_by("port"));
    }
}
