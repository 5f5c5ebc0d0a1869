//! Batch orchestration over repository lists and record directories.
//!
//! Every mode records exactly one outcome per input item. An item's error is
//! caught at its boundary and stored in the report; only setup failures
//! (unreadable input directory, uncreatable output directory) abort a run.
pub mod discover;
pub mod pool;
pub mod report;

use crate::config::EngineConfig;
use crate::facts::{fetch_or_fallback, FactsProvider, RepoSlug};
use crate::record::{read_record, write_record, Record};
use crate::synthesize::{
    attach_organization, attach_reference_publication, Overrides, Synthesizer,
};
use crate::upgrade::{remap_requirements, Upgrader};
use crate::util::display_path;
use crate::validate::Validator;
use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

pub use discover::{find_codemeta_files, project_name};
pub use pool::WorkerPool;
pub use report::{write_report, BatchReport, FailureKind, ItemOutcome, ValidationResults};

pub struct BulkProcessor {
    synthesizer: Synthesizer,
    upgrader: Upgrader,
    validator: Validator,
    pool: WorkerPool,
}

impl BulkProcessor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            synthesizer: Synthesizer::new(config),
            upgrader: Upgrader::new(config),
            validator: Validator::new(config.revision),
            pool: WorkerPool::new(config.workers),
        }
    }

    /// Fetch, synthesize, and save one record per repository URL.
    ///
    /// Items run on the worker pool; report order is completion order.
    pub fn process_repository_list(
        &self,
        provider: &dyn FactsProvider,
        repo_urls: &[String],
        output_dir: &Path,
        organization: Option<&Value>,
    ) -> Result<BatchReport> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;
        tracing::info!(
            repositories = repo_urls.len(),
            workers = self.pool.workers(),
            "processing repository list"
        );

        let urls = distinct_urls(repo_urls);
        let stems = output_stems(&urls);
        let mut report = BatchReport::new();
        self.pool.run(
            urls,
            |url| self.process_repository(provider, url, output_dir, &stems, organization),
            |url, result| {
                let outcome = match result {
                    Ok(Ok(path)) => ItemOutcome::Succeeded(display_path(&path)),
                    Ok(Err(err)) => ItemOutcome::failed(&err),
                    Err(message) => ItemOutcome::panicked(message),
                };
                log_outcome(&url, &outcome);
                report.record(url, outcome);
            },
        );
        Ok(report)
    }

    fn process_repository(
        &self,
        provider: &dyn FactsProvider,
        repo_url: &str,
        output_dir: &Path,
        stems: &HashMap<String, String>,
        organization: Option<&Value>,
    ) -> Result<PathBuf> {
        let slug = RepoSlug::parse(repo_url)?;
        let stem = stems
            .get(repo_url)
            .ok_or_else(|| anyhow!("{slug} is already written by another URL in this batch"))?;
        let facts = fetch_or_fallback(provider, &slug);
        let mut record = self
            .synthesizer
            .synthesize(&facts, repo_url, &Overrides::new());
        if let Some(organization) = organization {
            attach_organization(&mut record, organization);
        }
        let output = output_dir.join(format!("codemeta_{stem}.json"));
        write_record(&output, &record)?;
        Ok(output)
    }

    /// Upgrade every CodeMeta file in `input_dir`, one at a time.
    ///
    /// Without `output_dir` the files are rewritten in place.
    pub fn enhance_directory(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        organization: Option<&Value>,
    ) -> Result<BatchReport> {
        let files = find_codemeta_files(input_dir)?;
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        tracing::info!(files = files.len(), "enhancing directory");

        let mut report = BatchReport::new();
        for file in files {
            let output = match (output_dir, file.file_name()) {
                (Some(dir), Some(name)) => dir.join(name),
                _ => file.clone(),
            };
            let outcome = guarded(|| {
                self.enhance_file(&file, &output, organization)?;
                Ok(ItemOutcome::Succeeded(display_path(&output)))
            });
            record_file(&mut report, &file, outcome);
        }
        Ok(report)
    }

    /// Read, upgrade, optionally attach an organization, and write one file.
    fn enhance_file(
        &self,
        input: &Path,
        output: &Path,
        organization: Option<&Value>,
    ) -> Result<Record> {
        let original = read_record(input)?;
        let mut enhanced = self.upgrader.upgrade(&original);
        if let Some(organization) = organization {
            attach_organization(&mut enhanced, organization);
        }
        write_record(output, &enhanced)?;
        Ok(enhanced)
    }

    /// Rewrite string requirements through `mapping` in every file.
    pub fn update_software_requirements(
        &self,
        dir: &Path,
        mapping: &Map<String, Value>,
    ) -> Result<BatchReport> {
        let files = find_codemeta_files(dir)?;
        tracing::info!(files = files.len(), "updating software requirements");

        let mut report = BatchReport::new();
        for file in files {
            let outcome = guarded(|| {
                let mut record = read_record(&file)?;
                if !remap_requirements(&mut record, mapping) {
                    return Ok(ItemOutcome::Skipped(
                        "No string requirements to update".to_string(),
                    ));
                }
                write_record(&file, &record)?;
                Ok(ItemOutcome::Succeeded("Updated successfully".to_string()))
            });
            record_file(&mut report, &file, outcome);
        }
        Ok(report)
    }

    /// Attach a publication to each file whose project name has a mapping entry.
    pub fn add_reference_publications(
        &self,
        dir: &Path,
        publications: &Map<String, Value>,
    ) -> Result<BatchReport> {
        let files = find_codemeta_files(dir)?;
        tracing::info!(files = files.len(), "adding reference publications");

        let mut report = BatchReport::new();
        for file in files {
            let outcome = guarded(|| {
                let Some(publication) = publications.get(&project_name(&file)) else {
                    return Ok(ItemOutcome::Skipped(
                        "No publication mapping found".to_string(),
                    ));
                };
                let mut record = read_record(&file)?;
                attach_reference_publication(&mut record, publication.clone());
                write_record(&file, &record)?;
                Ok(ItemOutcome::Succeeded("Publication added".to_string()))
            });
            record_file(&mut report, &file, outcome);
        }
        Ok(report)
    }

    /// Validate every file; files are never modified.
    pub fn validate_directory(&self, dir: &Path) -> Result<ValidationResults> {
        let files = find_codemeta_files(dir)?;
        tracing::info!(files = files.len(), "validating directory");

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let findings = match read_record(&file) {
                Ok(record) => self.validator.validate(&record),
                Err(err) => {
                    tracing::error!(file = %display_path(&file), error = %format!("{err:#}"), "validation failed");
                    vec![format!("Validation error: {err:#}")]
                }
            };
            results.push((file, findings));
        }
        Ok(results)
    }
}

/// Drop repeated URLs, keeping the first occurrence.
fn distinct_urls(repo_urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(repo_urls.len());
    for url in repo_urls {
        if seen.insert(url.as_str()) {
            urls.push(url.clone());
        } else {
            tracing::warn!(item = %url, "duplicate repository URL skipped");
        }
    }
    urls
}

/// Output file stem per URL: the repo name, or `owner_name` when two owners
/// share a name. URLs that resolve to an already claimed stem get no entry.
fn output_stems(urls: &[String]) -> HashMap<String, String> {
    let slugs: Vec<(&String, RepoSlug)> = urls
        .iter()
        .filter_map(|url| RepoSlug::parse(url).ok().map(|slug| (url, slug)))
        .collect();
    let mut owners_per_name: HashMap<String, HashSet<String>> = HashMap::new();
    for (_, slug) in &slugs {
        owners_per_name
            .entry(slug.name.to_lowercase())
            .or_default()
            .insert(slug.owner.to_lowercase());
    }

    let mut claimed = HashSet::new();
    let mut stems = HashMap::new();
    for (url, slug) in slugs {
        let shared = owners_per_name
            .get(&slug.name.to_lowercase())
            .is_some_and(|owners| owners.len() > 1);
        let stem = if shared {
            format!("{}_{}", slug.owner, slug.name)
        } else {
            slug.name.clone()
        };
        if claimed.insert(stem.to_lowercase()) {
            stems.insert(url.clone(), stem);
        }
    }
    stems
}

/// Run one sequential item, converting both errors and panics to outcomes.
fn guarded<F>(item: F) -> ItemOutcome
where
    F: FnOnce() -> Result<ItemOutcome>,
{
    match panic::catch_unwind(AssertUnwindSafe(item)) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => ItemOutcome::failed(&err),
        Err(payload) => ItemOutcome::panicked(pool::panic_message(payload)),
    }
}

fn record_file(report: &mut BatchReport, file: &Path, outcome: ItemOutcome) {
    let key = display_path(file);
    log_outcome(&key, &outcome);
    report.record(key, outcome);
}

fn log_outcome(key: &str, outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::Succeeded(payload) => tracing::info!(item = key, %payload, "item succeeded"),
        ItemOutcome::Skipped(reason) => tracing::info!(item = key, %reason, "item skipped"),
        ItemOutcome::Failed { kind, message } => {
            tracing::error!(item = key, %kind, %message, "item failed")
        }
    }
}
