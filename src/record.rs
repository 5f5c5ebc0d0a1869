//! The CodeMeta record: an ordered JSON object with merge helpers.
//!
//! All merge paths go through [`Record::insert_if_absent`] so the
//! overwrite-only-if-absent law lives in exactly one place. A key that is
//! present with an explicit `null` counts as present.
use crate::error::CodemetaError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Field names used across the synthesizer, upgrader, and validator.
pub mod fields {
    pub const CONTEXT: &str = "@context";
    pub const TYPE: &str = "@type";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const URL: &str = "url";
    pub const CODE_REPOSITORY: &str = "codeRepository";
    pub const DATE_CREATED: &str = "dateCreated";
    pub const DATE_MODIFIED: &str = "dateModified";
    pub const LICENSE: &str = "license";
    pub const PROGRAMMING_LANGUAGE: &str = "programmingLanguage";
    pub const KEYWORDS: &str = "keywords";
    pub const AUTHOR: &str = "author";
    pub const MAINTAINER: &str = "maintainer";
    pub const DEVELOPMENT_STATUS: &str = "developmentStatus";
    pub const SOFTWARE_VERSION: &str = "softwareVersion";
    pub const APPLICATION_CATEGORY: &str = "applicationCategory";
    pub const APPLICATION_SUB_CATEGORY: &str = "applicationSubCategory";
    pub const OPERATING_SYSTEM: &str = "operatingSystem";
    pub const RUNTIME_PLATFORM: &str = "runtimePlatform";
    pub const SOFTWARE_HELP: &str = "softwareHelp";
    pub const README: &str = "readme";
    pub const ISSUE_TRACKER: &str = "issueTracker";
    pub const DOWNLOAD_URL: &str = "downloadUrl";
    pub const BUILD_INSTRUCTIONS: &str = "buildInstructions";
    pub const CONT_INTEGRATION: &str = "contIntegration";
    pub const HAS_SOURCE_CODE: &str = "hasSourceCode";
    pub const EMBARGO_DATE: &str = "embargoDate";
    pub const FUNDING: &str = "funding";
    pub const REFERENCE_PUBLICATION: &str = "referencePublication";
    pub const IS_PART_OF: &str = "isPartOf";
    pub const TARGET_PRODUCT: &str = "targetProduct";
    pub const RELATED_LINK: &str = "relatedLink";
    pub const SOFTWARE_REQUIREMENTS: &str = "softwareRequirements";
}

/// Type tag written on every synthesized record.
pub const SOFTWARE_SOURCE_CODE: &str = "SoftwareSourceCode";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded JSON value, rejecting anything but an object.
    pub fn from_value(value: Value) -> Result<Self, CodemetaError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CodemetaError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value of a field, treating non-strings as absent.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Whether the field is present and not JSON-falsy.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unconditionally set a field. Caller-supplied data goes through here.
    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Set a field only when the key is wholly absent; returns whether it was written.
    pub fn insert_if_absent(&mut self, key: &str, value: Value) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), value);
        true
    }

    /// Apply [`Record::insert_if_absent`] for every entry, in order.
    pub fn merge_absent<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in entries {
            self.insert_if_absent(&key, value);
        }
    }

    /// Overwrite with every entry, in order. Used for caller overrides.
    pub fn merge_overrides<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in entries {
            self.set(&key, value);
        }
    }

    /// Relocate a key to the final position, keeping every other key's order.
    pub fn move_to_end(&mut self, key: &str) {
        if !self.0.contains_key(key) {
            return;
        }
        let mut reordered = Map::with_capacity(self.0.len());
        let mut moved = None;
        for (name, value) in std::mem::take(&mut self.0) {
            if name == key {
                moved = Some(value);
            } else {
                reordered.insert(name, value);
            }
        }
        if let Some(value) = moved {
            reordered.insert(key.to_string(), value);
        }
        self.0 = reordered;
    }
}

/// JSON truthiness: null, false, zero, and empty strings/lists/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a record from JSON text.
pub fn parse_record(text: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(text).context("parse CodeMeta JSON")?;
    Ok(Record::from_value(value)?)
}

/// Encode a record as pretty JSON (2-space indent, non-ASCII kept verbatim).
pub fn render_record(record: &Record) -> Result<String> {
    serde_json::to_string_pretty(record).context("serialize CodeMeta record")
}

/// Load a record from disk.
pub fn read_record(path: &Path) -> Result<Record> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_record(&text).with_context(|| format!("decode {}", path.display()))
}

/// Persist a record in the stable presentation format.
pub fn write_record(path: &Path, record: &Record) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = render_record(record)?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), fields = record.len(), "record written");
    Ok(())
}
