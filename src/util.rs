use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Repository URLs from a text file: one per line, blank lines ignored.
pub fn read_repository_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

/// A JSON object file used as a name → value mapping.
pub fn read_json_map(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("{} must contain a JSON object", path.display())),
    }
}

/// A JSON array file; a single object is accepted as a one-element list.
pub fn read_json_list(path: &Path) -> Result<Vec<Value>> {
    match read_json(path)? {
        Value::Array(items) => Ok(items),
        value @ Value::Object(_) => Ok(vec![value]),
        _ => Err(anyhow!("{} must contain a JSON array", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repository_list_skips_blank_lines() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("repos.txt");
        fs::write(
            &path,
            "https://github.com/a/one\n\n   \n  https://github.com/a/two  \n",
        )
        .expect("write list");
        assert_eq!(
            read_repository_list(&path).expect("read list"),
            ["https://github.com/a/one", "https://github.com/a/two"]
        );
    }

    #[test]
    fn json_helpers_check_shape() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let object = dir.path().join("object.json");
        let array = dir.path().join("array.json");
        fs::write(&object, r#"{"metasyn": {"@type": "ScholarlyArticle"}}"#).expect("write");
        fs::write(&array, r#"[{"givenName": "Ada"}]"#).expect("write");

        assert!(read_json_map(&object).expect("map").contains_key("metasyn"));
        assert!(read_json_map(&array).is_err());
        assert_eq!(
            read_json_list(&array).expect("list"),
            vec![json!({"givenName": "Ada"})]
        );
        assert_eq!(read_json_list(&object).expect("list").len(), 1);
        assert!(read_json_list(&dir.path().join("missing.json")).is_err());
    }
}
