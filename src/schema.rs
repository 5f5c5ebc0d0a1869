//! CodeMeta schema revisions and the `@context` URIs that identify them.
use crate::error::CodemetaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Base URI shared by every published CodeMeta context.
pub const CONTEXT_BASE: &str = "https://doi.org/10.5063/schema/codemeta-";

/// Schema revisions the engine can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum SchemaRevision {
    #[serde(rename = "2.0")]
    #[value(name = "2.0")]
    V2,
    #[default]
    #[serde(rename = "3.0")]
    #[value(name = "3.0")]
    V3,
}

impl SchemaRevision {
    /// Return the revision tag as embedded in the context URI.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaRevision::V2 => "2.0",
            SchemaRevision::V3 => "3.0",
        }
    }

    /// The `@context` value written by the synthesizer and upgrader.
    pub fn context_url(&self) -> String {
        format!("{CONTEXT_BASE}{}", self.as_str())
    }

    /// Whether a record's `@context` value names this revision.
    pub fn matches_context(&self, context: &Value) -> bool {
        context_revision(context).as_deref() == Some(self.as_str())
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaRevision {
    type Err = CodemetaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "2.0" | "2" => Ok(SchemaRevision::V2),
            "3.0" | "3" => Ok(SchemaRevision::V3),
            other => Err(CodemetaError::UnsupportedSchema(other.to_string())),
        }
    }
}

fn revision_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"codemeta[-/]v?(\d+(?:\.\d+)?)").expect("revision pattern compiles")
    })
}

/// Extract the embedded revision from an `@context` value.
///
/// JSON-LD allows the context to be a list; the first CodeMeta entry wins.
pub fn context_revision(context: &Value) -> Option<String> {
    match context {
        Value::String(uri) => revision_pattern()
            .captures(uri)
            .map(|caps| normalize_revision(&caps[1])),
        Value::Array(items) => items.iter().find_map(context_revision),
        _ => None,
    }
}

fn normalize_revision(raw: &str) -> String {
    if raw.contains('.') {
        raw.to_string()
    } else {
        format!("{raw}.0")
    }
}
