//! Configuration for casflat.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable CASFLAT_CONFIG (path to a config file)
//! 2. Config file (.casflat/config.yaml) in the current directory or a parent
//! 3. ~/.casflat/config.yaml
//! 4. Built-in defaults
//!
//! Reference rules from a config file extend the built-in rules; an entry
//! for a type that already has a rule replaces it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{Extractor, MetaFieldSource, ReferenceRule, ReferenceRules};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CASFLAT_CONFIG";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    /// Referenced type name -> `covered_text` or `feature:<name>`
    #[serde(default)]
    pub reference_rules: BTreeMap<String, ReferenceRule>,
    #[serde(default)]
    pub meta_fields: Option<MetaFieldsConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaFieldsConfig {
    /// Type holding crawler metadata pairs
    pub crawler_type: Option<String>,
    /// Type holding content classification metadata pairs
    pub classification_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: Option<bool>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Display rules for reference-valued features
    pub reference_rules: ReferenceRules,
    /// Type names holding metadata pairs
    pub meta_field_types: MetaFieldTypes,
    /// Output settings
    pub output: OutputSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFieldTypes {
    pub crawler: String,
    pub classification: String,
}

impl Default for MetaFieldTypes {
    fn default() -> Self {
        Self {
            crawler: MetaFieldSource::Crawler.default_type_name().to_string(),
            classification: MetaFieldSource::Classification.default_type_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub pretty: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(None, None)
    }
}

impl ResolvedConfig {
    /// Build an extractor using the configured reference rules
    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.reference_rules.clone())
    }

    /// Type name holding metadata pairs for a source
    pub fn meta_field_type(&self, source: MetaFieldSource) -> &str {
        match source {
            MetaFieldSource::Crawler => &self.meta_field_types.crawler,
            MetaFieldSource::Classification => &self.meta_field_types.classification,
        }
    }
}

/// Find config file: explicit env var, then current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".casflat").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".casflat").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Apply a parsed config file over the defaults
fn resolve(config: Option<ConfigFile>, config_file: Option<PathBuf>) -> ResolvedConfig {
    let mut reference_rules = ReferenceRules::default();
    let mut meta_field_types = MetaFieldTypes::default();
    let mut output = OutputSettings::default();

    if let Some(config) = config {
        reference_rules.extend(config.reference_rules);

        let meta = config.meta_fields.unwrap_or_default();
        if let Some(crawler) = meta.crawler_type {
            meta_field_types.crawler = crawler;
        }
        if let Some(classification) = meta.classification_type {
            meta_field_types.classification = classification;
        }

        output.pretty = config.output.and_then(|o| o.pretty).unwrap_or(false);
    }

    ResolvedConfig {
        reference_rules,
        meta_field_types,
        output,
        config_file,
    }
}

/// Load configuration from an explicit file
pub fn load_from(path: &Path) -> Result<ResolvedConfig> {
    let config = load_config_file(path)?;
    Ok(resolve(Some(config), Some(path.to_path_buf())))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    match find_config_file() {
        Some(path) => load_from(&path),
        None => Ok(ResolvedConfig::default()),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Load configuration from all sources, bypassing the cache
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
