use crate::batch::{write_report, BatchReport, BulkProcessor};
use crate::cli::{BulkArgs, EnhanceArgs, GenerateArgs, OrganizationArgs, ValidateArgs};
use crate::config::EngineConfig;
use crate::facts::GithubFacts;
use crate::organization::{resolve_organization, Publication};
use crate::record::{read_record, write_record};
use crate::synthesize::{
    attach_authors, attach_organization, attach_reference_publication,
    attach_software_requirements, parse_override, Overrides, Synthesizer,
};
use crate::upgrade::Upgrader;
use crate::util::{read_json_list, read_json_map, read_repository_list};
use crate::validate::{is_clean, Validator};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;

fn organization_context(args: &OrganizationArgs) -> Result<Option<Value>> {
    resolve_organization(args.organization, args.organization_file.as_deref())
}

pub fn run_generate(config: &EngineConfig, args: GenerateArgs) -> Result<()> {
    let overrides = args
        .overrides
        .iter()
        .map(|raw| parse_override(raw.as_str()))
        .collect::<Result<Overrides, _>>()?;
    let organization = organization_context(&args.organization)?;
    let authors = args.authors.as_deref().map(read_json_list).transpose()?;
    let requirements = args
        .requirements
        .as_deref()
        .map(read_json_list)
        .transpose()?;

    println!("Generating CodeMeta for: {}", args.repo);
    let provider = GithubFacts::new(config.facts.clone());
    let mut record = Synthesizer::new(config)
        .generate(&provider, &args.repo, &overrides)
        .with_context(|| format!("generate CodeMeta for {}", args.repo))?;

    if let Some(authors) = authors {
        attach_authors(&mut record, authors);
    }
    if let Some(requirements) = requirements {
        attach_software_requirements(&mut record, requirements);
    }
    if let (Some(doi), Some(title)) = (&args.publication_doi, &args.publication_title) {
        let mut publication = Publication::article(doi, title);
        publication.year = args.publication_year.as_deref();
        publication.publisher = args.publisher.as_deref();
        attach_reference_publication(&mut record, publication.to_value());
    }
    if let Some(organization) = &organization {
        attach_organization(&mut record, organization);
    }
    write_record(&args.output, &record)?;

    let warnings = Validator::new(config.revision).core_findings(&record);
    if !warnings.is_empty() {
        println!("Validation warnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    println!("CodeMeta file generated: {}", args.output.display());
    Ok(())
}

pub fn run_enhance(config: &EngineConfig, args: EnhanceArgs) -> Result<()> {
    let organization = organization_context(&args.organization)?;
    let output = args.output.as_ref().unwrap_or(&args.input);

    println!("Enhancing CodeMeta file: {}", args.input.display());
    let upgrader = Upgrader::new(config);
    let original = read_record(&args.input)?;
    let mut enhanced = upgrader.upgrade(&original);
    if args.upgrade_requirements {
        let changed = upgrader.upgrade_software_requirements(&mut enhanced, !args.no_github_mapping);
        tracing::debug!(changed, "software requirements upgrade");
    }
    if let Some(organization) = &organization {
        attach_organization(&mut enhanced, organization);
    }
    write_record(output, &enhanced)?;

    for message in Validator::new(config.revision).enhancement_findings(&enhanced) {
        println!("  {message}");
    }
    println!("CodeMeta file enhanced: {}", output.display());
    Ok(())
}

pub fn run_bulk(config: &EngineConfig, args: BulkArgs) -> Result<()> {
    let processor = BulkProcessor::new(config);
    let organization = organization_context(&args.organization)?;

    let report = if let Some(repos_file) = &args.repos_file {
        let output = args
            .output
            .as_deref()
            .ok_or_else(|| anyhow!("--output is required with --repos-file"))?;
        let urls = read_repository_list(repos_file)?;
        println!("Processing {} repositories...", urls.len());
        let provider = GithubFacts::new(config.facts.clone());
        processor.process_repository_list(&provider, &urls, output, organization.as_ref())?
    } else if let Some(directory) = &args.directory {
        if let Some(mapping_path) = &args.requirements {
            let mapping = read_json_map(mapping_path)?;
            println!("Updating software requirements in: {}", directory.display());
            processor.update_software_requirements(directory, &mapping)?
        } else if let Some(mapping_path) = &args.publications {
            let publications = read_json_map(mapping_path)?;
            println!("Adding reference publications in: {}", directory.display());
            processor.add_reference_publications(directory, &publications)?
        } else {
            println!("Enhancing CodeMeta files in: {}", directory.display());
            processor.enhance_directory(directory, args.output.as_deref(), organization.as_ref())?
        }
    } else {
        return Err(anyhow!("specify either --repos-file or --directory"));
    };

    print_summary(&report);
    if let Some(path) = &args.report {
        write_report(&report, path)?;
        println!("Report saved: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("Summary:");
    println!("  Total: {}", report.total());
    println!("  Successful: {}", report.successful());
    println!("  Failed: {}", report.failed());
    if report.failed() > 0 {
        println!();
        println!("Failed items:");
        for (key, outcome) in report.failures() {
            println!("  {key}: {}", outcome.render());
        }
    }
}

pub fn run_validate(config: &EngineConfig, args: ValidateArgs) -> Result<()> {
    let path = &args.path;
    if path.is_file() {
        let record = read_record(path)?;
        let validator = Validator::new(config.revision);
        let warnings = validator.core_findings(&record);
        let messages = validator.enhancement_findings(&record);

        println!("Validating: {}", path.display());
        if warnings.is_empty() {
            println!("Validation passed");
        } else {
            println!("Validation issues:");
        }
        for message in warnings.iter().chain(&messages) {
            println!("  {message}");
        }
        return Ok(());
    }
    if !path.is_dir() {
        return Err(anyhow!("path not found: {}", path.display()));
    }

    println!("Validating CodeMeta files in: {}", path.display());
    let results = BulkProcessor::new(config).validate_directory(path)?;
    let with_issues = results
        .iter()
        .filter(|(_, findings)| !is_clean(findings))
        .count();
    println!();
    println!("Validation Summary:");
    println!("  Total files: {}", results.len());
    println!("  Files with issues: {with_issues}");
    println!("  Clean files: {}", results.len() - with_issues);

    if args.verbose {
        println!();
        println!("Detailed Results:");
        for (file, findings) in &results {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            println!();
            println!("{name}:");
            for finding in findings {
                println!("  {finding}");
            }
        }
    }
    Ok(())
}
