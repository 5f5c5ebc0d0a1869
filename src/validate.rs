//! Record validator.
//!
//! Findings are data, never errors. Each check appends independent,
//! human-readable lines; the validator never mutates the record.
use crate::record::{fields, Record};
use crate::schema::SchemaRevision;
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 5] = [
    fields::CONTEXT,
    fields::TYPE,
    fields::NAME,
    fields::DESCRIPTION,
    fields::URL,
];

pub const RECOMMENDED_FIELDS: [&str; 4] = [
    fields::AUTHOR,
    fields::LICENSE,
    fields::PROGRAMMING_LANGUAGE,
    fields::DATE_CREATED,
];

pub const COMPREHENSIVE_FIELDS: [&str; 9] = [
    fields::MAINTAINER,
    fields::DEVELOPMENT_STATUS,
    fields::APPLICATION_CATEGORY,
    fields::OPERATING_SYSTEM,
    fields::RUNTIME_PLATFORM,
    fields::SOFTWARE_HELP,
    fields::README,
    fields::ISSUE_TRACKER,
    fields::DOWNLOAD_URL,
];

pub const PASSED_MESSAGE: &str = "Enhancement validation passed - CodeMeta file is comprehensive";
const LEGACY_REQUIREMENTS_MESSAGE: &str =
    "Software requirements should be in object format, not strings";

pub struct Validator {
    revision: SchemaRevision,
}

impl Validator {
    pub fn new(revision: SchemaRevision) -> Self {
        Self { revision }
    }

    /// Run every check. A clean record yields exactly [`PASSED_MESSAGE`].
    pub fn validate(&self, record: &Record) -> Vec<String> {
        let mut findings = self.core_findings(record);
        findings.extend(self.comprehensive_finding(record));
        findings.extend(requirements_shape_finding(record));
        if findings.is_empty() {
            findings.push(PASSED_MESSAGE.to_string());
        }
        findings
    }

    /// Required, recommended, and schema-consistency checks.
    pub fn core_findings(&self, record: &Record) -> Vec<String> {
        let mut findings = Vec::new();
        for field in REQUIRED_FIELDS {
            if !record.contains(field) {
                findings.push(format!("Missing required field: {field}"));
            }
        }
        for field in RECOMMENDED_FIELDS {
            if !record.is_truthy(field) {
                findings.push(format!("Missing recommended field: {field}"));
            }
        }
        if let Some(context) = record.get(fields::CONTEXT) {
            if !self.revision.matches_context(context) {
                findings.push(format!(
                    "Schema version mismatch: expected {}",
                    self.revision
                ));
            }
        }
        findings
    }

    /// Checks run after an enhancement pass, including the positive signal.
    pub fn enhancement_findings(&self, record: &Record) -> Vec<String> {
        let mut findings = Vec::new();
        let context_ok = record
            .get(fields::CONTEXT)
            .is_some_and(|context| self.revision.matches_context(context));
        if !context_ok {
            findings.push(format!(
                "Warning: Schema version may not match target {}",
                self.revision
            ));
        }
        findings.extend(self.comprehensive_finding(record));
        findings.extend(requirements_shape_finding(record));
        if findings.is_empty() {
            findings.push(PASSED_MESSAGE.to_string());
        }
        findings
    }

    fn comprehensive_finding(&self, record: &Record) -> Option<String> {
        let missing: Vec<&str> = COMPREHENSIVE_FIELDS
            .into_iter()
            .filter(|field| !record.contains(field))
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(format!("Missing comprehensive fields: {}", missing.join(", ")))
        }
    }
}

fn requirements_shape_finding(record: &Record) -> Option<String> {
    match record.get(fields::SOFTWARE_REQUIREMENTS) {
        Some(Value::Array(items)) if items.first().is_some_and(Value::is_string) => {
            Some(LEGACY_REQUIREMENTS_MESSAGE.to_string())
        }
        _ => None,
    }
}

/// Whether a finding list is the single positive signal.
pub fn is_clean(findings: &[String]) -> bool {
    findings.len() == 1 && findings[0] == PASSED_MESSAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::facts::{License, SourceFacts};
    use crate::synthesize::{attach_authors, Synthesizer};
    use crate::upgrade::Upgrader;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(SchemaRevision::V3)
    }

    fn complete_record() -> Record {
        let config = EngineConfig::default();
        let facts = SourceFacts {
            name: Some("metasyn".to_string()),
            description: Some("synthetic data generation tool".to_string()),
            created_at: Some("2022-03-01T10:00:00Z".to_string()),
            updated_at: None,
            license: Some(License {
                name: "MIT".to_string(),
                spdx_id: Some("MIT".to_string()),
            }),
            language: Some("Python".to_string()),
        };
        let mut record = Synthesizer::new(&config).synthesize(
            &facts,
            "https://github.com/sodascience/metasyn",
            &Vec::new(),
        );
        attach_authors(&mut record, vec![json!({"@type": "Person", "givenName": "Ada"})]);
        record
    }

    #[test]
    fn complete_record_yields_single_positive_finding() {
        let findings = validator().validate(&complete_record());
        assert_eq!(findings, [PASSED_MESSAGE]);
        assert!(is_clean(&findings));
    }

    #[test]
    fn empty_record_reports_every_missing_field() {
        let findings = validator().validate(&Record::new());
        for field in REQUIRED_FIELDS {
            assert!(findings.contains(&format!("Missing required field: {field}")));
        }
        for field in RECOMMENDED_FIELDS {
            assert!(findings.contains(&format!("Missing recommended field: {field}")));
        }
        assert!(findings.contains(&format!(
            "Missing comprehensive fields: {}",
            COMPREHENSIVE_FIELDS.join(", ")
        )));
        assert!(!findings.iter().any(|f| f == PASSED_MESSAGE));
        assert!(!findings.iter().any(|f| f.contains("Schema version")));
    }

    #[test]
    fn falsy_recommended_fields_are_reported() {
        let mut record = complete_record();
        record.set("author", json!([]));
        record.set("license", Value::Null);
        let findings = validator().validate(&record);
        assert_eq!(
            findings,
            [
                "Missing recommended field: author",
                "Missing recommended field: license"
            ]
        );
    }

    #[test]
    fn schema_mismatch_is_a_single_finding() {
        let mut record = complete_record();
        record.set("@context", json!("https://doi.org/10.5063/schema/codemeta-2.0"));
        assert_eq!(
            validator().validate(&record),
            ["Schema version mismatch: expected 3.0"]
        );
        assert_eq!(
            validator().enhancement_findings(&record),
            ["Warning: Schema version may not match target 3.0"]
        );
    }

    #[test]
    fn legacy_string_requirements_are_flagged() {
        let mut record = complete_record();
        record.set("softwareRequirements", json!(["numpy", "pandas"]));
        assert_eq!(validator().validate(&record), [LEGACY_REQUIREMENTS_MESSAGE]);

        record.set(
            "softwareRequirements",
            json!([{"@type": "SoftwareApplication", "name": "numpy"}]),
        );
        assert!(is_clean(&validator().validate(&record)));
    }

    #[test]
    fn comprehensive_gaps_are_combined_in_one_finding() {
        let record = Record::from_value(json!({
            "@context": "https://doi.org/10.5063/schema/codemeta-3.0",
            "maintainer": [],
            "developmentStatus": "active",
            "applicationCategory": "Data Science",
            "operatingSystem": "Cross-platform",
            "runtimePlatform": ["Python 3.8+"],
            "softwareHelp": null,
            "readme": "x"
        }))
        .expect("record");
        assert_eq!(
            validator().enhancement_findings(&record),
            ["Missing comprehensive fields: issueTracker, downloadUrl"]
        );
    }

    #[test]
    fn upgraded_legacy_record_with_authors_passes() {
        let legacy = Record::from_value(json!({
            "@context": "https://doi.org/10.5063/schema/codemeta-2.0",
            "@type": "SoftwareSourceCode",
            "name": "osmenrich",
            "description": "OpenStreetMap enrichment",
            "url": "https://github.com/sodascience/osmenrich",
            "author": [{"@type": "Person", "givenName": "Ada"}],
            "license": "https://spdx.org/licenses/MIT",
            "programmingLanguage": ["R"],
            "dateCreated": "2021-01-01"
        }))
        .expect("record");
        let upgraded = Upgrader::new(&EngineConfig::default()).upgrade(&legacy);
        assert!(is_clean(&validator().validate(&upgraded)));
    }
}
