//! Record synthesizer: builds a fresh record from repository facts.
use crate::config::EngineConfig;
use crate::error::CodemetaError;
use crate::facts::{fetch_or_fallback, FactsProvider, RepoSlug, SourceFacts};
use crate::infer::{self, InferenceRules, RepositoryUrls};
use crate::record::{fields, Record, SOFTWARE_SOURCE_CODE};
use crate::schema::SchemaRevision;
use anyhow::Result;
use serde_json::{json, Value};

/// Caller-supplied fields merged last, overwriting inferred values.
pub type Overrides = Vec<(String, Value)>;

pub struct Synthesizer {
    revision: SchemaRevision,
    rules: InferenceRules,
}

impl Synthesizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            revision: config.revision,
            rules: InferenceRules::new(config.tables.clone()),
        }
    }

    /// Fetch facts for `repo_url` (falling back on failure) and synthesize.
    ///
    /// Only a malformed URL is an error.
    pub fn generate(
        &self,
        provider: &dyn FactsProvider,
        repo_url: &str,
        overrides: &Overrides,
    ) -> Result<Record, CodemetaError> {
        let slug = RepoSlug::parse(repo_url)?;
        let facts = fetch_or_fallback(provider, &slug);
        Ok(self.synthesize(&facts, repo_url, overrides))
    }

    /// Build a baseline record from facts, then apply every inference rule.
    pub fn synthesize(&self, facts: &SourceFacts, repo_url: &str, overrides: &Overrides) -> Record {
        let mut record = self.base_structure(facts, repo_url);
        self.add_comprehensive_metadata(&mut record, facts, repo_url);
        record.merge_overrides(overrides.iter().cloned());
        record.move_to_end(fields::IS_PART_OF);
        record
    }

    fn base_structure(&self, facts: &SourceFacts, repo_url: &str) -> Record {
        let mut record = Record::new();
        record.set(fields::CONTEXT, json!(self.revision.context_url()));
        record.set(fields::TYPE, json!(SOFTWARE_SOURCE_CODE));
        record.set(
            fields::NAME,
            json!(facts.name.as_deref().unwrap_or("Unknown")),
        );
        record.set(
            fields::DESCRIPTION,
            json!(facts
                .description
                .as_deref()
                .unwrap_or("No description available")),
        );
        record.set(fields::URL, json!(repo_url));
        record.set(fields::CODE_REPOSITORY, json!(repo_url));
        record.set(fields::DATE_CREATED, date_only(facts.created_at.as_deref()));
        record.set(fields::DATE_MODIFIED, date_only(facts.updated_at.as_deref()));
        record.set(
            fields::LICENSE,
            infer::format_license(facts.license.as_ref().map(|license| license.as_pair())),
        );
        let languages: Vec<&str> = primary_language(facts).into_iter().collect();
        record.set(fields::PROGRAMMING_LANGUAGE, json!(languages));
        record
    }

    fn add_comprehensive_metadata(&self, record: &mut Record, facts: &SourceFacts, repo_url: &str) {
        let category = self.rules.classify(
            facts.name.as_deref().unwrap_or_default(),
            facts.description.as_deref().unwrap_or_default(),
            &[],
        );
        record.set(fields::DEVELOPMENT_STATUS, json!("active"));
        for (key, value) in category.into_fields() {
            record.set(&key, value);
        }
        record.set(
            fields::OPERATING_SYSTEM,
            json!(self.rules.fallback_platform()),
        );
        record.set(
            fields::RUNTIME_PLATFORM,
            json!(self.rules.platforms_for(primary_language(facts))),
        );
        record.merge_overrides(RepositoryUrls::derive(repo_url).fields());
        record.set(fields::HAS_SOURCE_CODE, json!(repo_url));
        record.merge_overrides(infer::research_context_defaults());
        let name = record.str_field(fields::NAME).map(str::to_string);
        record.set(
            fields::TARGET_PRODUCT,
            json!(infer::target_product(name.as_deref())),
        );
    }
}

fn primary_language(facts: &SourceFacts) -> Option<&str> {
    facts.language.as_deref().filter(|lang| !lang.is_empty())
}

fn date_only(timestamp: Option<&str>) -> Value {
    match timestamp.filter(|ts| !ts.is_empty()) {
        Some(ts) => json!(ts.split('T').next().unwrap_or(ts)),
        None => Value::Null,
    }
}

/// Parse a `KEY=VALUE` override; the value is JSON when it parses, else a string.
pub fn parse_override(raw: &str) -> Result<(String, Value), CodemetaError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CodemetaError::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CodemetaError::InvalidOverride(raw.to_string()));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Attach an organization context verbatim as the final `isPartOf` key.
pub fn attach_organization(record: &mut Record, organization: &Value) {
    record.set(fields::IS_PART_OF, organization.clone());
    record.move_to_end(fields::IS_PART_OF);
}

/// Set the author list; the first author becomes maintainer unless one exists.
pub fn attach_authors(record: &mut Record, authors: Vec<Value>) {
    let first = authors.first().cloned();
    record.set(fields::AUTHOR, Value::Array(authors));
    if let Some(first) = first {
        record.insert_if_absent(fields::MAINTAINER, json!([first]));
    }
    record.move_to_end(fields::IS_PART_OF);
}

pub fn attach_software_requirements(record: &mut Record, requirements: Vec<Value>) {
    record.set(fields::SOFTWARE_REQUIREMENTS, Value::Array(requirements));
    record.move_to_end(fields::IS_PART_OF);
}

pub fn attach_reference_publication(record: &mut Record, publication: Value) {
    record.set(fields::REFERENCE_PUBLICATION, publication);
    record.move_to_end(fields::IS_PART_OF);
}
