use super::*;
use crate::record::is_truthy;
use serde_json::json;

fn upgrader() -> Upgrader {
    Upgrader::new(&EngineConfig::default())
}

fn record(value: Value) -> Record {
    Record::from_value(value).expect("object literal")
}

fn legacy_record() -> Record {
    record(json!({
        "@context": "https://doi.org/10.5063/schema/codemeta-2.0",
        "@type": "SoftwareSourceCode",
        "name": "osmenrich",
        "description": "Enrich geographic data with OpenStreetMap features",
        "codeRepository": "https://github.com/sodascience/osmenrich",
        "isPartOf": {"@type": "Organization", "name": "SODA Science"},
        "author": [
            {"@type": "Person", "givenName": "Ada"},
            {"@type": "Person", "givenName": "Bob"}
        ],
        "programmingLanguage": ["R"],
        "softwareRequirements": ["dplyr", "https://github.com/ropensci/osmdata"]
    }))
}

fn sample_records() -> Vec<Record> {
    vec![
        legacy_record(),
        Record::new(),
        record(json!({"name": "bare", "url": "https://github.com/x/bare"})),
        record(json!({
            "@context": ["https://schema.org", "https://w3id.org/codemeta/3.0"],
            "author": {"@type": "Person", "givenName": "Solo"},
            "funding": null,
            "keywords": ["dashboard"],
            "programmingLanguage": "JavaScript"
        })),
    ]
}

#[test]
fn upgrade_is_idempotent() {
    let upgrader = upgrader();
    for original in sample_records() {
        let once = upgrader.upgrade(&original);
        let twice = upgrader.upgrade(&once);
        assert_eq!(once, twice);
        let keys_once: Vec<&String> = once.keys().collect();
        let keys_twice: Vec<&String> = twice.keys().collect();
        assert_eq!(keys_once, keys_twice);
    }
}

#[test]
fn upgrade_never_overwrites_truthy_fields() {
    let upgrader = upgrader();
    for original in sample_records() {
        let upgraded = upgrader.upgrade(&original);
        for key in original.keys().filter(|key| key.as_str() != "@context") {
            let value = original.get(key).expect("key present");
            if is_truthy(value) {
                assert_eq!(upgraded.get(key), Some(value), "{key} was overwritten");
            }
        }
    }
}

#[test]
fn upgrade_always_targets_configured_revision() {
    let upgrader = upgrader();
    for original in sample_records() {
        let upgraded = upgrader.upgrade(&original);
        let context = upgraded.str_field("@context").expect("context string");
        assert!(context.contains("3.0"));
    }

    let v2 = Upgrader::new(&EngineConfig {
        revision: SchemaRevision::V2,
        ..EngineConfig::default()
    });
    let upgraded = v2.upgrade(&legacy_record());
    assert_eq!(
        upgraded.str_field("@context"),
        Some("https://doi.org/10.5063/schema/codemeta-2.0")
    );
}

#[test]
fn upgrade_does_not_mutate_input() {
    let original = legacy_record();
    let snapshot = original.clone();
    let _ = upgrader().upgrade(&original);
    assert_eq!(original, snapshot);
}

#[test]
fn upgrade_fills_comprehensive_fields() {
    let upgraded = upgrader().upgrade(&legacy_record());
    let repo = "https://github.com/sodascience/osmenrich";

    assert_eq!(
        upgraded.get("maintainer"),
        Some(&json!([{"@type": "Person", "givenName": "Ada"}]))
    );
    assert_eq!(upgraded.str_field("developmentStatus"), Some("active"));
    assert_eq!(upgraded.str_field("softwareVersion"), Some("1.0.0"));
    assert_eq!(upgraded.str_field("applicationCategory"), Some("Data Science"));
    assert_eq!(upgraded.str_field("applicationSubCategory"), Some("Research Tools"));
    assert_eq!(upgraded.str_field("operatingSystem"), Some("Cross-platform"));
    assert_eq!(upgraded.get("runtimePlatform"), Some(&json!(["R 4.0+"])));
    assert_eq!(
        upgraded.str_field("issueTracker").map(str::to_string),
        Some(format!("{repo}/issues"))
    );
    assert_eq!(upgraded.str_field("hasSourceCode"), Some(repo));
    assert_eq!(
        upgraded.str_field("targetProduct"),
        Some("osmenrich software package")
    );
    assert_eq!(upgraded.get("relatedLink"), Some(&json!([])));
    for key in ["funding", "embargoDate", "referencePublication"] {
        assert_eq!(upgraded.get(key), Some(&Value::Null), "{key} placeholder");
    }
    assert_eq!(upgraded.keys().last().map(String::as_str), Some("isPartOf"));
}

#[test]
fn upgrade_keeps_explicit_nulls_and_object_authors() {
    let original = record(json!({
        "author": {"@type": "Person", "givenName": "Solo"},
        "funding": null,
        "applicationCategory": null,
        "programmingLanguage": "JavaScript"
    }));
    let upgraded = upgrader().upgrade(&original);
    assert_eq!(upgraded.get("funding"), Some(&Value::Null));
    assert_eq!(upgraded.get("applicationCategory"), Some(&Value::Null));
    assert!(!upgraded.contains("applicationSubCategory"));
    assert_eq!(
        upgraded.get("maintainer"),
        Some(&json!([{"@type": "Person", "givenName": "Solo"}]))
    );
    assert_eq!(
        upgraded.get("runtimePlatform"),
        Some(&json!(["Node.js", "Web Browser"]))
    );
    assert_eq!(upgraded.get("isPartOf"), Some(&Value::Null));
}

#[test]
fn repository_urls_fall_back_to_url_field() {
    let upgraded = upgrader().upgrade(&record(json!({
        "url": "https://github.com/x/bare",
        "readme": "https://x.example/README"
    })));
    assert_eq!(upgraded.str_field("readme"), Some("https://x.example/README"));
    assert_eq!(
        upgraded.str_field("downloadUrl"),
        Some("https://github.com/x/bare/archive/refs/heads/main.zip")
    );

    let upgraded = upgrader().upgrade(&Record::new());
    assert!(!upgraded.contains("issueTracker"));
    assert!(!upgraded.contains("hasSourceCode"));
    assert_eq!(upgraded.str_field("targetProduct"), Some("Software software package"));
}

#[test]
fn string_requirements_become_software_applications() {
    let upgrader = upgrader();
    let mut upgraded = upgrader.upgrade(&record(json!({
        "softwareRequirements": ["NumPy", "https://github.com/ropensci/osmdata", "polars"]
    })));
    assert!(upgrader.upgrade_software_requirements(&mut upgraded, true));
    assert_eq!(
        upgraded.get("softwareRequirements"),
        Some(&json!([
            {
                "@id": "https://github.com/numpy/numpy",
                "@type": "SoftwareApplication",
                "identifier": "numpy",
                "name": "NumPy"
            },
            {
                "@id": "https://github.com/ropensci/osmdata",
                "@type": "SoftwareApplication",
                "identifier": "osmdata",
                "name": "osmdata"
            },
            {
                "@id": "https://github.com/search?q=polars",
                "@type": "SoftwareApplication",
                "identifier": "polars",
                "name": "polars"
            }
        ]))
    );
    assert!(!upgrader.upgrade_software_requirements(&mut upgraded, true));

    let mut plain = record(json!({ "softwareRequirements": ["NumPy"] }));
    assert!(upgrader.upgrade_software_requirements(&mut plain, false));
    assert_eq!(plain.get("softwareRequirements").unwrap()[0]["@id"], "NumPy");
}

#[test]
fn requirement_upgrade_drops_scalar_entries() {
    let upgrader = upgrader();
    let mut rec = record(json!({
        "softwareRequirements": ["polars", 3, null, {"name": "kept"}]
    }));
    assert!(upgrader.upgrade_software_requirements(&mut rec, false));
    let requirements = rec.get("softwareRequirements").unwrap().as_array().unwrap();
    assert_eq!(requirements.len(), 2);
    assert_eq!(requirements[0]["name"], "polars");
    assert_eq!(requirements[1], json!({"name": "kept"}));
}

#[test]
fn remap_uses_mapping_then_minimal_objects() {
    let mut rec = legacy_record();
    let mut mapping = Map::new();
    mapping.insert(
        "dplyr".to_string(),
        json!({"@id": "https://dplyr.tidyverse.org", "@type": "SoftwareApplication", "name": "dplyr"}),
    );
    assert!(remap_requirements(&mut rec, &mapping));
    assert_eq!(
        rec.get("softwareRequirements"),
        Some(&json!([
            {"@id": "https://dplyr.tidyverse.org", "@type": "SoftwareApplication", "name": "dplyr"},
            {
                "@id": "https://github.com/ropensci/osmdata",
                "@type": "SoftwareApplication",
                "identifier": "osmdata",
                "name": "osmdata"
            }
        ]))
    );
    assert!(!remap_requirements(&mut rec, &mapping));
    assert!(!remap_requirements(&mut Record::new(), &mapping));
}
