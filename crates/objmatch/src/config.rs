use serde::{Deserialize, Serialize};

use objmatch_annotate::DEFAULT_ANNOTATION_KEY;
use objmatch_merge::{KindSchema, PatchStrategy};
use objmatch_options::OptionsConfig;

use crate::error::ConfigError;

/// Configuration for a [`PatchMaker`](crate::PatchMaker).
///
/// ```toml
/// annotation_key = "example.dev/last-applied"
///
/// [options]
/// ignore_pdb_selector = true
/// ignore_fields = ["spec.replicas"]
///
/// [[schemas]]
/// apiVersion = "v1"
/// kind = "Service"
/// fields."spec.ports" = { strategy = "merge", mergeKey = "port" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchMakerConfig {
    /// Annotation holding the last-applied configuration.
    pub annotation_key: String,
    /// Options every calculation made through [`PatchMaker::default_options`](crate::PatchMaker::default_options) uses.
    pub options: OptionsConfig,
    /// Merge schemas for structured kinds.
    pub schemas: Vec<KindSchema>,
}

impl Default for PatchMakerConfig {
    fn default() -> Self {
        Self {
            annotation_key: DEFAULT_ANNOTATION_KEY.to_string(),
            options: OptionsConfig::default(),
            schemas: Vec::new(),
        }
    }
}

impl PatchMakerConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annotation_key.is_empty() || self.annotation_key.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidAnnotationKey(self.annotation_key.clone()));
        }
        self.options.validate()?;

        for schema in &self.schemas {
            let invalid = |reason: String| ConfigError::InvalidSchema {
                kind: schema.kind.clone(),
                reason,
            };
            if schema.kind.is_empty() {
                return Err(invalid("kind must not be empty".into()));
            }
            for (path, field) in &schema.fields {
                if path.split('.').any(str::is_empty) {
                    return Err(invalid(format!("invalid field path '{path}'")));
                }
                if field.strategy == PatchStrategy::Replace && field.merge_key.is_some() {
                    return Err(invalid(format!("field '{path}' has a merge key but replaces")));
                }
                if field.merge_key.as_deref() == Some("") {
                    return Err(invalid(format!("field '{path}' has an empty merge key")));
                }
            }
        }
        Ok(())
    }
}
