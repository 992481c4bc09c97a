use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    classifier::taxonomy::{self, MatchPolicy, Taxonomy},
    inference::types::InferenceConfig,
    pipeline::types::PipelinesConfig,
    sanitizer::SanitizerConfig,
};

const SCHEMA_FILE_NAME: &str = "categorizer.schema.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub taxonomies: BTreeMap<String, Taxonomy>,
    #[serde(default)]
    pub pipelines: PipelinesConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            logging: LoggingConfig::default(),
            inference: InferenceConfig::default(),
            sanitizer: SanitizerConfig::default(),
            taxonomies: BTreeMap::new(),
            pipelines: PipelinesConfig::default(),
        };
        config.add_builtin_taxonomies();
        config
    }
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/categorizer")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_enabled_true() -> bool {
    true
}

fn default_stderr_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_enabled: bool,
    #[serde(default = "default_stderr_level")]
    pub stderr_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_enabled: true,
            stderr_level: default_stderr_level(),
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;
        config.add_builtin_taxonomies();
        config.resolve_paths(config_base);
        config.validate()?;

        Ok(config)
    }

    pub fn taxonomy(&self, name: &str) -> Result<&Taxonomy> {
        self.taxonomies.get(name).ok_or_else(|| {
            anyhow!(
                "unknown taxonomy '{}'; known taxonomies: {}",
                name,
                self.taxonomies.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    fn add_builtin_taxonomies(&mut self) {
        let builtins = [
            (taxonomy::BODY_SYSTEMS, Taxonomy::body_systems()),
            (taxonomy::CLINICAL_GROUPS, Taxonomy::clinical_groups()),
            (taxonomy::OPEN_SET, Taxonomy::open_set()),
        ];
        for (name, builtin) in builtins {
            self.taxonomies.entry(name.to_string()).or_insert(builtin);
        }
    }

    fn resolve_paths(&mut self, config_base: &Path) {
        let pipelines = &mut self.pipelines;
        for path in [
            &mut pipelines.sanitize.input,
            &mut pipelines.sanitize.output,
            &mut pipelines.categorize.input,
            &mut pipelines.categorize.output,
            &mut pipelines.route.input_dir,
            &mut pipelines.route.output_dir,
        ] {
            if !path.is_absolute() {
                *path = config_base.join(&*path);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        self.taxonomy(&self.pipelines.categorize.taxonomy)
            .context("pipelines.categorize.taxonomy")?;
        self.taxonomy(&self.pipelines.route.taxonomy)
            .context("pipelines.route.taxonomy")?;

        for (name, taxonomy) in &self.taxonomies {
            if matches!(taxonomy.match_policy, MatchPolicy::Contains { .. })
                && taxonomy.labels.is_empty()
            {
                return Err(anyhow!(
                    "taxonomy '{}' uses contains matching but has no labels",
                    name
                ));
            }
        }
        Ok(())
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join(SCHEMA_FILE_NAME);
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or {} next to it",
        SCHEMA_FILE_NAME
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
