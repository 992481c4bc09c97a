use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{SLUG_KEY, record_fields_mut};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanitizerConfig {
    #[serde(default = "default_remove_keys")]
    pub remove_keys: Vec<String>,
    #[serde(default)]
    pub default_slug: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            remove_keys: default_remove_keys(),
            default_slug: String::new(),
        }
    }
}

fn default_remove_keys() -> Vec<String> {
    [
        "MaladyId",
        "Symbol",
        "MiFts",
        "Score",
        "Parent",
        "Childs",
        "NumSiblings",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone)]
pub struct FieldSanitizer {
    config: SanitizerConfig,
}

impl FieldSanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Drops the configured keys from the record's `Data` object and fills a
    /// missing `Slug`. Returns how many keys were removed; records without a
    /// `Data` object are left alone.
    pub fn sanitize(&self, record: &mut Value) -> usize {
        let Some(fields) = record_fields_mut(record) else {
            return 0;
        };

        let mut removed = 0;
        for key in &self.config.remove_keys {
            if fields.shift_remove(key.as_str()).is_some() {
                removed += 1;
            }
        }

        if !fields.contains_key(SLUG_KEY) {
            fields.insert(
                SLUG_KEY.to_string(),
                Value::String(self.config.default_slug.clone()),
            );
        }

        removed
    }
}

impl Default for FieldSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}
