//! CLI argument parsing for the CodeMeta generator.
//!
//! Handlers live in `commands`; this module only describes the surface.
use crate::organization::OrganizationPreset;
use crate::schema::SchemaRevision;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "codemeta",
    version,
    about = "Generate, enhance, and validate CodeMeta files for research software",
    after_help = "Examples:\n  codemeta generate --repo https://github.com/owner/repo --output codemeta.json\n  codemeta enhance --input codemeta.json --schema 3.0\n  codemeta bulk --repos-file repos.txt --output ./output/\n  codemeta bulk --directory ./codemeta_files/ --organization soda\n  codemeta validate ./codemeta_files/ --verbose",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Target CodeMeta schema revision
    #[arg(long, global = true, value_enum)]
    pub schema: Option<SchemaRevision>,

    /// Optional engine config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Enhance(EnhanceArgs),
    Bulk(BulkArgs),
    Validate(ValidateArgs),
}

/// Organization context shared by generate, enhance, and bulk.
#[derive(Args, Debug, Clone, Default)]
pub struct OrganizationArgs {
    /// Built-in organization context to attach as isPartOf
    #[arg(long, value_enum)]
    pub organization: Option<OrganizationPreset>,

    /// Organization context from a JSON object file (wins over --organization)
    #[arg(long, value_name = "FILE")]
    pub organization_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Generate a CodeMeta file from a GitHub repository")]
pub struct GenerateArgs {
    /// GitHub repository URL
    #[arg(long, value_name = "URL")]
    pub repo: String,

    /// Output CodeMeta file path
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub organization: OrganizationArgs,

    /// Override a field (KEY=VALUE, VALUE parsed as JSON when possible)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// JSON file with the author list (Person objects)
    #[arg(long, value_name = "FILE")]
    pub authors: Option<PathBuf>,

    /// JSON file with software requirements (SoftwareApplication objects)
    #[arg(long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// DOI of the reference publication
    #[arg(long, value_name = "DOI", requires = "publication_title")]
    pub publication_doi: Option<String>,

    /// Title of the reference publication
    #[arg(long, value_name = "TITLE", requires = "publication_doi")]
    pub publication_title: Option<String>,

    /// Publication year
    #[arg(long, value_name = "YEAR", requires = "publication_doi")]
    pub publication_year: Option<String>,

    /// Publisher name
    #[arg(long, value_name = "NAME", requires = "publication_doi")]
    pub publisher: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Upgrade an existing CodeMeta file in place or to a new path")]
pub struct EnhanceArgs {
    /// Input CodeMeta file path
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file path (overwrites input if not specified)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub organization: OrganizationArgs,

    /// Convert string software requirements into SoftwareApplication objects
    #[arg(long)]
    pub upgrade_requirements: bool,

    /// Keep requirement ids as given instead of mapping packages to repository URLs
    #[arg(long, requires = "upgrade_requirements")]
    pub no_github_mapping: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Process many repositories or CodeMeta files")]
pub struct BulkArgs {
    /// File containing repository URLs (one per line)
    #[arg(long, value_name = "FILE", conflicts_with = "directory", required_unless_present = "directory")]
    pub repos_file: Option<PathBuf>,

    /// Directory containing CodeMeta files to process
    #[arg(long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Output directory (required with --repos-file; in place otherwise)
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub organization: OrganizationArgs,

    /// Number of parallel workers for repository processing
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Rewrite string requirements using a name -> object JSON mapping
    #[arg(long, value_name = "FILE", requires = "directory", conflicts_with = "publications")]
    pub requirements: Option<PathBuf>,

    /// Attach publications from a project -> publication JSON mapping
    #[arg(long, value_name = "FILE", requires = "directory")]
    pub publications: Option<PathBuf>,

    /// Write a processing report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Validate a CodeMeta file or every CodeMeta file in a directory")]
pub struct ValidateArgs {
    /// File or directory to validate
    pub path: PathBuf,

    /// Show per-file findings for directories
    #[arg(long)]
    pub verbose: bool,
}
