//! Per-item batch outcomes and the aggregate report file.
use crate::error::CodemetaError;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix that marks a failed item in serialized report details.
pub const ERROR_MARKER: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    Io,
    Decode,
    Panic,
    Other,
}

impl FailureKind {
    /// Classify an error by the first recognizable cause in its chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.is::<CodemetaError>() {
                return FailureKind::InvalidInput;
            }
            if cause.is::<std::io::Error>() {
                return FailureKind::Io;
            }
            if cause.is::<serde_json::Error>() {
                return FailureKind::Decode;
            }
        }
        FailureKind::Other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Io => "io",
            FailureKind::Decode => "decode",
            FailureKind::Panic => "panic",
            FailureKind::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded(String),
    Skipped(String),
    Failed { kind: FailureKind, message: String },
}

impl ItemOutcome {
    pub fn failed(err: &anyhow::Error) -> Self {
        ItemOutcome::Failed {
            kind: FailureKind::classify(err),
            message: format!("{err:#}"),
        }
    }

    pub fn panicked(message: String) -> Self {
        ItemOutcome::Failed {
            kind: FailureKind::Panic,
            message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }

    /// Report text: the payload, or `Error: <message>` for failures.
    pub fn render(&self) -> String {
        match self {
            ItemOutcome::Succeeded(payload) | ItemOutcome::Skipped(payload) => payload.clone(),
            ItemOutcome::Failed { message, .. } => format!("{ERROR_MARKER}: {message}"),
        }
    }
}

/// Item key → outcome, kept in the order items completed.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    entries: Vec<(String, ItemOutcome)>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: impl Into<String>, outcome: ItemOutcome) {
        self.entries.push((key.into(), outcome));
    }

    pub fn entries(&self) -> &[(String, ItemOutcome)] {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&ItemOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, outcome)| outcome)
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn successful(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ItemOutcome)> {
        self.entries()
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(key, outcome)| (key.as_str(), outcome))
    }

    /// Serialized detail mapping (key → rendered outcome).
    pub fn details(&self) -> Map<String, Value> {
        self.entries()
            .iter()
            .map(|(key, outcome)| (key.clone(), Value::String(outcome.render())))
            .collect()
    }
}

/// Findings per validated file, in discovery order.
pub type ValidationResults = Vec<(PathBuf, Vec<String>)>;

#[derive(Serialize)]
struct ReportFile {
    timestamp: String,
    total_files: usize,
    successful: usize,
    failed: usize,
    details: Map<String, Value>,
}

/// Write the aggregate report once, at the end of a batch run.
pub fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    let file = ReportFile {
        timestamp: chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S%.6f")
            .to_string(),
        total_files: report.total(),
        successful: report.successful(),
        failed: report.failed(),
        details: report.details(),
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(&file).context("serialize batch report")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "report saved");
    Ok(())
}
