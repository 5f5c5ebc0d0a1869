//! Record upgrader: brings an existing record to the target revision.
//!
//! Apart from `@context`, which is always rewritten, every step fills a
//! field only when its key is wholly absent, so running the upgrade twice is
//! the same as running it once.
use crate::config::EngineConfig;
use crate::infer::{self, InferenceRules, RepositoryUrls};
use crate::record::{fields, Record};
use crate::schema::SchemaRevision;
use serde_json::{json, Map, Value};

const GITHUB_PREFIX: &str = "https://github.com/";
const SOFTWARE_APPLICATION: &str = "SoftwareApplication";

pub struct Upgrader {
    revision: SchemaRevision,
    rules: InferenceRules,
}

impl Upgrader {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            revision: config.revision,
            rules: InferenceRules::new(config.tables.clone()),
        }
    }

    /// Return an upgraded copy of `record`; the input is never mutated.
    pub fn upgrade(&self, record: &Record) -> Record {
        let mut upgraded = record.clone();
        upgraded.set(fields::CONTEXT, json!(self.revision.context_url()));
        fill_maintainer(&mut upgraded);
        upgraded.insert_if_absent(fields::DEVELOPMENT_STATUS, json!("active"));
        upgraded.insert_if_absent(fields::SOFTWARE_VERSION, json!("1.0.0"));

        if !upgraded.contains(fields::APPLICATION_CATEGORY) {
            let category = self.rules.classify_record(&upgraded);
            upgraded.merge_absent(category.into_fields());
        }
        upgraded.insert_if_absent(
            fields::OPERATING_SYSTEM,
            json!(self.rules.fallback_platform()),
        );
        if !upgraded.contains(fields::RUNTIME_PLATFORM) {
            let platforms = self.rules.platforms_for_record(&upgraded);
            upgraded.set(fields::RUNTIME_PLATFORM, json!(platforms));
        }

        if let Some(repo_url) = repository_url(&upgraded) {
            upgraded.merge_absent(RepositoryUrls::derive(&repo_url).fields());
            upgraded.insert_if_absent(fields::HAS_SOURCE_CODE, json!(repo_url));
        }

        upgraded.merge_absent(infer::research_context_defaults());
        let target = infer::target_product(upgraded.str_field(fields::NAME));
        upgraded.insert_if_absent(fields::TARGET_PRODUCT, json!(target));
        upgraded.insert_if_absent(fields::RELATED_LINK, json!([]));

        upgraded.move_to_end(fields::IS_PART_OF);
        upgraded
    }

    /// Rewrite string requirements as `SoftwareApplication` objects.
    ///
    /// Lists whose first entry is already typed are left untouched. Entries
    /// that are neither strings nor objects are dropped. Returns whether the
    /// record changed.
    pub fn upgrade_software_requirements(&self, record: &mut Record, github_mapping: bool) -> bool {
        let Some(requirements) = record.get(fields::SOFTWARE_REQUIREMENTS) else {
            return false;
        };
        let upgraded = match requirements {
            Value::Array(items) if is_structured(items) => return false,
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(req) => Some(self.convert_string_requirement(req, github_mapping)),
                    Value::Object(_) => Some(item.clone()),
                    _ => None,
                })
                .collect(),
            Value::String(req) => vec![self.convert_string_requirement(req, github_mapping)],
            _ => return false,
        };
        let upgraded = Value::Array(upgraded);
        if record.get(fields::SOFTWARE_REQUIREMENTS) == Some(&upgraded) {
            return false;
        }
        record.set(fields::SOFTWARE_REQUIREMENTS, upgraded);
        true
    }

    fn convert_string_requirement(&self, requirement: &str, github_mapping: bool) -> Value {
        let (package, id) = if requirement.starts_with(GITHUB_PREFIX) {
            let package = requirement
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or("unknown");
            (package.to_string(), requirement.to_string())
        } else if github_mapping {
            (requirement.to_string(), self.rules.package_url(requirement))
        } else {
            (requirement.to_string(), requirement.to_string())
        };
        json!({
            "@id": id,
            "@type": SOFTWARE_APPLICATION,
            "identifier": package.to_lowercase(),
            "name": package,
        })
    }
}

fn is_structured(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key(fields::TYPE))
}

fn fill_maintainer(record: &mut Record) {
    if record.contains(fields::MAINTAINER) {
        return;
    }
    let first = match record.get(fields::AUTHOR) {
        Some(Value::Array(authors)) => authors.first().cloned(),
        Some(author @ Value::Object(_)) => Some(author.clone()),
        _ => None,
    };
    if let Some(first) = first {
        record.set(fields::MAINTAINER, json!([first]));
    }
}

/// `codeRepository`, else `url`, when it is a non-empty string.
fn repository_url(record: &Record) -> Option<String> {
    [fields::CODE_REPOSITORY, fields::URL]
        .into_iter()
        .filter_map(|key| record.str_field(key))
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

/// Replace legacy string requirements using a package→object mapping.
///
/// Unmapped strings become a minimal `SoftwareApplication` whose `@id` is the
/// original string. Returns whether the record changed.
pub fn remap_requirements(record: &mut Record, mapping: &Map<String, Value>) -> bool {
    let Some(Value::Array(items)) = record.get(fields::SOFTWARE_REQUIREMENTS) else {
        return false;
    };
    if !items.iter().any(Value::is_string) {
        return false;
    }
    let remapped: Vec<Value> = items
        .iter()
        .map(|item| match item {
            Value::String(req) => {
                let package = req.rsplit('/').next().unwrap_or(req);
                mapping.get(package).cloned().unwrap_or_else(|| {
                    json!({
                        "@id": req,
                        "@type": SOFTWARE_APPLICATION,
                        "identifier": package,
                        "name": package,
                    })
                })
            }
            other => other.clone(),
        })
        .collect();
    record.set(fields::SOFTWARE_REQUIREMENTS, Value::Array(remapped));
    true
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
