//! Field inference rules.
//!
//! Every rule is a pure function of a partial record (or raw facts) plus the
//! injected [`InferenceTables`]. Absent or empty inputs map to a defined
//! default; no rule fails.
use crate::config::InferenceTables;
use crate::record::{fields, Record};
use serde_json::{json, Value};

const SPDX_BASE: &str = "http://spdx.org/licenses/";

/// An `applicationCategory` / `applicationSubCategory` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub category: String,
    pub subcategory: String,
}

impl Category {
    pub fn into_fields(self) -> [(String, Value); 2] {
        [
            (
                fields::APPLICATION_CATEGORY.to_string(),
                Value::String(self.category),
            ),
            (
                fields::APPLICATION_SUB_CATEGORY.to_string(),
                Value::String(self.subcategory),
            ),
        ]
    }
}

/// Table-driven inference rules shared by the synthesizer and upgrader.
#[derive(Debug, Clone, Default)]
pub struct InferenceRules {
    tables: InferenceTables,
}

impl InferenceRules {
    pub fn new(tables: InferenceTables) -> Self {
        Self { tables }
    }

    /// Classify free text; the first keyword group that matches wins.
    pub fn classify(&self, name: &str, description: &str, keywords: &[String]) -> Category {
        let mut parts = vec![name, description];
        parts.extend(keywords.iter().map(String::as_str));
        let blob = parts.join(" ").to_lowercase();

        self.tables
            .category_groups
            .iter()
            .find(|group| {
                group
                    .keywords
                    .iter()
                    .filter(|word| !word.is_empty())
                    .any(|word| blob.contains(&word.to_lowercase()))
            })
            .map(|group| Category {
                category: group.category.clone(),
                subcategory: group.subcategory.clone(),
            })
            .unwrap_or_else(|| Category {
                category: self.tables.default_category.0.clone(),
                subcategory: self.tables.default_category.1.clone(),
            })
    }

    /// Classify a record from its name, description, and keywords.
    pub fn classify_record(&self, record: &Record) -> Category {
        let name = record.str_field(fields::NAME).unwrap_or_default();
        let description = record.str_field(fields::DESCRIPTION).unwrap_or_default();
        let keywords = record
            .get(fields::KEYWORDS)
            .map(string_list)
            .unwrap_or_default();
        self.classify(name, description, &keywords)
    }

    /// Map languages to runtime platforms, concatenated in input order.
    ///
    /// Unknown languages contribute nothing; an empty result becomes the
    /// single fallback platform.
    pub fn platforms_for<'a, I>(&self, languages: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let platforms: Vec<String> = languages
            .into_iter()
            .filter_map(|language| self.tables.platforms.get(language))
            .flatten()
            .cloned()
            .collect();
        if platforms.is_empty() {
            vec![self.tables.fallback_platform.clone()]
        } else {
            platforms
        }
    }

    /// Runtime platforms for a record's `programmingLanguage` field.
    pub fn platforms_for_record(&self, record: &Record) -> Vec<String> {
        let languages = record
            .get(fields::PROGRAMMING_LANGUAGE)
            .map(language_names)
            .unwrap_or_default();
        self.platforms_for(languages.iter().map(String::as_str))
    }

    pub fn fallback_platform(&self) -> &str {
        &self.tables.fallback_platform
    }

    /// Resolve a bare package name to a repository URL.
    pub fn package_url(&self, package: &str) -> String {
        self.tables
            .package_urls
            .get(&package.to_lowercase())
            .cloned()
            .unwrap_or_else(|| format!("https://github.com/search?q={package}"))
    }
}

/// Documentation and support URLs derived from a repository base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrls {
    pub help: String,
    pub readme: String,
    pub issues: String,
    pub download: String,
    pub ci: String,
}

impl RepositoryUrls {
    /// Derive the canonical sub-URLs by fixed-suffix concatenation.
    pub fn derive(base: &str) -> Self {
        let readme = format!("{base}/blob/main/README.md");
        Self {
            help: readme.clone(),
            readme,
            issues: format!("{base}/issues"),
            download: format!("{base}/archive/refs/heads/main.zip"),
            ci: format!("{base}/actions"),
        }
    }

    /// Record fields for these URLs, in presentation order.
    ///
    /// `buildInstructions` rides along with the help page.
    pub fn fields(&self) -> Vec<(String, Value)> {
        vec![
            (fields::SOFTWARE_HELP.to_string(), website(&self.help)),
            (fields::README.to_string(), json!(self.readme)),
            (fields::ISSUE_TRACKER.to_string(), json!(self.issues)),
            (fields::DOWNLOAD_URL.to_string(), json!(self.download)),
            (fields::BUILD_INSTRUCTIONS.to_string(), website(&self.readme)),
            (fields::CONT_INTEGRATION.to_string(), json!(self.ci)),
        ]
    }
}

fn website(url: &str) -> Value {
    json!({ "@type": "WebSite", "url": url })
}

/// Format an optional `(name, identifier)` license pair.
pub fn format_license(license: Option<(&str, Option<&str>)>) -> Value {
    let Some((name, identifier)) = license else {
        return Value::Null;
    };
    match identifier.filter(|id| !id.is_empty()) {
        Some(id) => json!({ "@id": format!("{SPDX_BASE}{id}"), "name": name }),
        None => json!({ "name": name }),
    }
}

/// Explicit placeholders for research-context fields.
pub fn research_context_defaults() -> [(String, Value); 4] {
    [
        (fields::EMBARGO_DATE.to_string(), Value::Null),
        (fields::FUNDING.to_string(), Value::Null),
        (fields::REFERENCE_PUBLICATION.to_string(), Value::Null),
        (fields::IS_PART_OF.to_string(), Value::Null),
    ]
}

/// `targetProduct` text for a project name.
pub fn target_product(name: Option<&str>) -> String {
    format!("{} software package", name.unwrap_or("Software"))
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn language_names(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(|name| vec![name.to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "infer_tests.rs"]
mod tests;
