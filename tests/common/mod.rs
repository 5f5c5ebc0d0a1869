//! Shared helpers for running the `codemeta` binary in integration tests.
#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Nothing listens here, so every facts fetch takes the fallback path.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

pub fn codemeta() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_codemeta"));
    command
        .env("CODEMETA_API_BASE", UNREACHABLE_API)
        .env("RUST_LOG", "warn");
    command
}

pub fn run(args: &[&str]) -> Output {
    codemeta().args(args).output().expect("run codemeta")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("parse {}: {err}", path.display()))
}

pub fn write_json(path: &Path, value: &Value) {
    let text = serde_json::to_string_pretty(value).expect("serialize fixture");
    fs::write(path, text).unwrap_or_else(|err| panic!("write {}: {err}", path.display()));
}

pub fn last_key(value: &Value) -> Option<&str> {
    value
        .as_object()
        .and_then(|map| map.keys().last())
        .map(String::as_str)
}
