use super::*;

fn temp_config_path(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("codemeta.config.json");
    std::fs::write(&path, contents.as_bytes()).expect("write config");
    path
}

#[test]
fn defaults_target_revision_three_with_four_workers() {
    let config = EngineConfig::default();
    assert_eq!(config.revision, SchemaRevision::V3);
    assert_eq!(config.workers, DEFAULT_WORKERS);
    assert_eq!(config.facts.api_base, DEFAULT_API_BASE);
    assert_eq!(config.tables.fallback_platform, CROSS_PLATFORM);
}

#[test]
fn cli_overrides_beat_file_which_beats_environment() {
    let file = ConfigFile {
        schema_version: CONFIG_SCHEMA_VERSION,
        target_revision: Some(SchemaRevision::V2),
        workers: Some(8),
        api_base: Some("http://file.example/".to_string()),
        ..ConfigFile::default()
    };
    let overrides = ConfigOverrides {
        revision: Some(SchemaRevision::V3),
        workers: None,
    };
    let config = resolve_config(
        Some(file),
        &overrides,
        Some("http://env.example".to_string()),
    )
    .expect("resolve config");
    assert_eq!(config.revision, SchemaRevision::V3);
    assert_eq!(config.workers, 8);
    assert_eq!(config.facts.api_base, "http://file.example");

    let config = resolve_config(
        None,
        &ConfigOverrides::default(),
        Some("http://env.example".to_string()),
    )
    .expect("resolve config");
    assert_eq!(config.facts.api_base, "http://env.example");
}

#[test]
fn load_config_file_replaces_tables() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_config_path(
        &dir,
        r#"{
  "schema_version": 1,
  "platforms": { "Julia": ["Julia 1.6+"] },
  "category_groups": [
    { "keywords": ["genome"], "category": "Bioinformatics", "subcategory": "Genomics" }
  ]
}"#,
    );
    let file = load_config_file(&path).expect("load config");
    let config = resolve_config(Some(file), &ConfigOverrides::default(), None)
        .expect("resolve config");
    assert_eq!(
        config.tables.platforms.get("Julia"),
        Some(&vec!["Julia 1.6+".to_string()])
    );
    assert_eq!(config.tables.category_groups.len(), 1);
    assert_eq!(config.tables.category_groups[0].category, "Bioinformatics");
}

#[test]
fn package_url_keys_from_file_match_any_case() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_config_path(
        &dir,
        r#"{
  "schema_version": 1,
  "package_urls": { "NumPy": "https://github.com/numpy/numpy" }
}"#,
    );
    let file = load_config_file(&path).expect("load config");
    let config = resolve_config(Some(file), &ConfigOverrides::default(), None)
        .expect("resolve config");
    let rules = crate::infer::InferenceRules::new(config.tables);
    assert_eq!(rules.package_url("NumPy"), "https://github.com/numpy/numpy");
    assert_eq!(rules.package_url("numpy"), "https://github.com/numpy/numpy");
}

#[test]
fn rejects_unknown_schema_version_and_zero_workers() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_config_path(&dir, r#"{ "schema_version": 7 }"#);
    let err = load_config_file(&path).expect_err("schema version 7 is unsupported");
    assert!(err.to_string().contains("schema_version 7"));

    let path = temp_config_path(&dir, r#"{ "schema_version": 1, "workers": 0 }"#);
    assert!(load_config_file(&path).is_err());

    let err = resolve_config(
        None,
        &ConfigOverrides {
            revision: None,
            workers: Some(0),
        },
        None,
    )
    .expect_err("zero workers rejected");
    assert!(err.to_string().contains("--workers"));
}

#[test]
fn rejects_unknown_keys() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_config_path(&dir, r#"{ "schema_version": 1, "wokrers": 2 }"#);
    assert!(load_config_file(&path).is_err());
}
