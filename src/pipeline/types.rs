use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::{
    Classification,
    taxonomy::{BODY_SYSTEMS, CLINICAL_GROUPS},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizePipelineConfig {
    #[serde(default = "default_sanitize_input")]
    pub input: PathBuf,
    #[serde(default = "default_sanitize_output")]
    pub output: PathBuf,
    #[serde(default = "default_flat_indent")]
    pub indent: usize,
}

impl Default for SanitizePipelineConfig {
    fn default() -> Self {
        Self {
            input: default_sanitize_input(),
            output: default_sanitize_output(),
            indent: default_flat_indent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizePipelineConfig {
    #[serde(default = "default_categorize_input")]
    pub input: PathBuf,
    #[serde(default = "default_categorize_output")]
    pub output: PathBuf,
    #[serde(default = "default_flat_indent")]
    pub indent: usize,
    #[serde(default = "default_categorize_taxonomy")]
    pub taxonomy: String,
}

impl Default for CategorizePipelineConfig {
    fn default() -> Self {
        Self {
            input: default_categorize_input(),
            output: default_categorize_output(),
            indent: default_flat_indent(),
            taxonomy: default_categorize_taxonomy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePipelineConfig {
    #[serde(default = "default_route_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_route_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_route_indent")]
    pub indent: usize,
    #[serde(default = "default_route_taxonomy")]
    pub taxonomy: String,
    #[serde(default)]
    pub sanitize: bool,
    #[serde(default = "default_enabled_true")]
    pub create_input_dir: bool,
}

impl Default for RoutePipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_route_input_dir(),
            output_dir: default_route_output_dir(),
            indent: default_route_indent(),
            taxonomy: default_route_taxonomy(),
            sanitize: false,
            create_input_dir: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelinesConfig {
    #[serde(default)]
    pub sanitize: SanitizePipelineConfig,
    #[serde(default)]
    pub categorize: CategorizePipelineConfig,
    #[serde(default)]
    pub route: RoutePipelineConfig,
}

fn default_sanitize_input() -> PathBuf {
    PathBuf::from("Data/mc-x.json")
}

fn default_sanitize_output() -> PathBuf {
    PathBuf::from("New Data/mc-x.json")
}

fn default_categorize_input() -> PathBuf {
    PathBuf::from("Data/mc-s.json")
}

fn default_categorize_output() -> PathBuf {
    PathBuf::from("New Data2/mc-s.json")
}

fn default_categorize_taxonomy() -> String {
    BODY_SYSTEMS.to_string()
}

fn default_route_input_dir() -> PathBuf {
    PathBuf::from("New Data")
}

fn default_route_output_dir() -> PathBuf {
    PathBuf::from("Categorized-Diseases")
}

fn default_route_taxonomy() -> String {
    CLINICAL_GROUPS.to_string()
}

fn default_flat_indent() -> usize {
    4
}

fn default_route_indent() -> usize {
    2
}

fn default_enabled_true() -> bool {
    true
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub files_seen: usize,
    pub files_skipped: usize,
    pub records_processed: usize,
    pub keys_removed: usize,
    pub sentinel_fallbacks: usize,
    pub write_failures: usize,
    pub written: Vec<PathBuf>,
    pub categories: BTreeMap<String, usize>,
}

impl RunReport {
    pub fn record_classification(&mut self, classification: &Classification) {
        *self
            .categories
            .entry(classification.label.clone())
            .or_default() += 1;
        if classification.is_sentinel() {
            self.sentinel_fallbacks += 1;
        }
    }
}
