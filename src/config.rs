//! Engine configuration and inference tables.
//!
//! Keyword groups, the language→platform table, and the package→repository
//! table are data handed to the rules at construction time. An optional JSON
//! config file can replace any of them without touching rule logic.
use crate::schema::SchemaRevision;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const API_BASE_ENV: &str = "CODEMETA_API_BASE";
pub const CROSS_PLATFORM: &str = "Cross-platform";

/// One keyword group of the category classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub keywords: Vec<String>,
    pub category: String,
    pub subcategory: String,
}

/// Lookup data consumed by the field inference rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceTables {
    /// Evaluated in order; the first group with a matching keyword wins.
    pub category_groups: Vec<CategoryGroup>,
    pub default_category: (String, String),
    pub platforms: BTreeMap<String, Vec<String>>,
    pub fallback_platform: String,
    pub package_urls: BTreeMap<String, String>,
}

impl Default for InferenceTables {
    fn default() -> Self {
        Self {
            category_groups: default_category_groups(),
            default_category: (
                "Research Software".to_string(),
                "Scientific Computing".to_string(),
            ),
            platforms: default_platforms(),
            fallback_platform: CROSS_PLATFORM.to_string(),
            package_urls: default_package_urls(),
        }
    }
}

fn group(keywords: &[&str], category: &str, subcategory: &str) -> CategoryGroup {
    CategoryGroup {
        keywords: keywords.iter().map(|word| word.to_string()).collect(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
    }
}

fn default_category_groups() -> Vec<CategoryGroup> {
    vec![
        // Generation terms almost always co-occur with "data", so they are tested first.
        group(
            &["synthetic", "generation", "simulation"],
            "Data Science",
            "Data Generation",
        ),
        group(
            &["data", "analysis", "statistics", "research", "science"],
            "Data Science",
            "Research Tools",
        ),
        group(
            &["web", "visualization", "dashboard", "interface"],
            "Web Application",
            "Data Visualization",
        ),
        group(
            &["workshop", "tutorial", "education", "teaching"],
            "Education",
            "Training Materials",
        ),
    ]
}

fn default_platforms() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 8] = [
        ("Python", &["Python 3.8+"]),
        ("R", &["R 4.0+"]),
        ("JavaScript", &["Node.js", "Web Browser"]),
        ("Java", &["Java 8+"]),
        ("C++", &[CROSS_PLATFORM]),
        ("C", &[CROSS_PLATFORM]),
        ("Go", &[CROSS_PLATFORM]),
        ("Rust", &[CROSS_PLATFORM]),
    ];
    entries
        .into_iter()
        .map(|(language, platforms)| {
            (
                language.to_string(),
                platforms.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}

fn default_package_urls() -> BTreeMap<String, String> {
    [
        ("numpy", "https://github.com/numpy/numpy"),
        ("pandas", "https://github.com/pandas-dev/pandas"),
        ("requests", "https://github.com/psf/requests"),
        ("flask", "https://github.com/pallets/flask"),
        ("django", "https://github.com/django/django"),
        ("tensorflow", "https://github.com/tensorflow/tensorflow"),
        ("pytorch", "https://github.com/pytorch/pytorch"),
        ("scikit-learn", "https://github.com/scikit-learn/scikit-learn"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}

/// Settings for the remote facts provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactsSettings {
    pub api_base: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FactsSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("codemeta-gen/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Resolved engine configuration shared by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub revision: SchemaRevision,
    pub tables: InferenceTables,
    pub workers: usize,
    pub facts: FactsSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            revision: SchemaRevision::default(),
            tables: InferenceTables::default(),
            workers: DEFAULT_WORKERS,
            facts: FactsSettings::default(),
        }
    }
}

/// On-disk config file. Every key except `schema_version` is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision: Option<SchemaRevision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_groups: Option<Vec<CategoryGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_urls: Option<BTreeMap<String, String>>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub revision: Option<SchemaRevision>,
    pub workers: Option<usize>,
}

/// Load a config file from disk.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ConfigFile =
        serde_json::from_slice(&bytes).context("parse codemeta config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate config schema and user-provided values.
pub fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported codemeta config schema_version {}",
            config.schema_version
        ));
    }
    if config.workers == Some(0) {
        return Err(anyhow!("workers must be at least 1"));
    }
    if let Some(api_base) = config.api_base.as_deref() {
        if api_base.trim().is_empty() {
            return Err(anyhow!("api_base must be non-empty"));
        }
    }
    if config.timeout_secs == Some(0) {
        return Err(anyhow!("timeout_secs must be at least 1"));
    }
    if let Some(groups) = &config.category_groups {
        for (idx, group) in groups.iter().enumerate() {
            if group.keywords.iter().all(|word| word.trim().is_empty()) {
                return Err(anyhow!("category_groups[{idx}] has no keywords"));
            }
        }
    }
    if let Some(platforms) = &config.platforms {
        if let Some((language, _)) = platforms.iter().find(|(_, list)| list.is_empty()) {
            return Err(anyhow!("platforms entry for {language:?} must be non-empty"));
        }
    }
    Ok(())
}

/// Resolve the engine config: CLI flag > config file > environment > default.
pub fn resolve_config(
    file: Option<ConfigFile>,
    overrides: &ConfigOverrides,
    env_api_base: Option<String>,
) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();
    if let Some(api_base) = env_api_base.filter(|value| !value.trim().is_empty()) {
        config.facts.api_base = api_base;
    }
    if let Some(file) = file {
        if let Some(revision) = file.target_revision {
            config.revision = revision;
        }
        if let Some(workers) = file.workers {
            config.workers = workers;
        }
        if let Some(api_base) = file.api_base {
            config.facts.api_base = api_base;
        }
        if let Some(timeout_secs) = file.timeout_secs {
            config.facts.timeout = Duration::from_secs(timeout_secs);
        }
        if let Some(user_agent) = file.user_agent {
            config.facts.user_agent = user_agent;
        }
        if let Some(groups) = file.category_groups {
            config.tables.category_groups = groups;
        }
        if let Some(platforms) = file.platforms {
            config.tables.platforms = platforms;
        }
        if let Some(package_urls) = file.package_urls {
            config.tables.package_urls = package_urls
                .into_iter()
                .map(|(package, url)| (package.to_lowercase(), url))
                .collect();
        }
    }
    if let Some(revision) = overrides.revision {
        config.revision = revision;
    }
    if let Some(workers) = overrides.workers {
        if workers == 0 {
            return Err(anyhow!("--workers must be at least 1"));
        }
        config.workers = workers;
    }
    config.facts.api_base = config.facts.api_base.trim_end_matches('/').to_string();
    Ok(config)
}

/// Load the optional config file and apply the precedence chain.
pub fn load_engine_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<EngineConfig> {
    let file = path.map(load_config_file).transpose()?;
    resolve_config(file, overrides, std::env::var(API_BASE_ENV).ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
