//! Typed errors for malformed single-item input.
//!
//! Everything else flows through `anyhow`; these variants exist so batch
//! outcomes can tell bad input apart from I/O and decode failures.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodemetaError {
    #[error("invalid GitHub URL: {0}")]
    InvalidRepositoryUrl(String),
    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
    #[error("unsupported CodeMeta schema version {0:?} (expected \"2.0\" or \"3.0\")")]
    UnsupportedSchema(String),
    #[error("invalid override {0:?}: expected KEY=VALUE")]
    InvalidOverride(String),
}
