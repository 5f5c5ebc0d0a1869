mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod facts;
mod infer;
mod organization;
mod record;
mod schema;
mod synthesize;
mod upgrade;
mod util;
mod validate;

use anyhow::Result;
use clap::Parser;
use cli::{Command, RootArgs};
use config::{load_engine_config, ConfigOverrides};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.debug);

    let workers = match &args.command {
        Command::Bulk(bulk) => bulk.workers,
        _ => None,
    };
    let overrides = ConfigOverrides {
        revision: args.schema,
        workers,
    };
    let config = load_engine_config(args.config.as_deref(), &overrides)?;
    tracing::debug!(revision = %config.revision, workers = config.workers, "engine config resolved");

    match args.command {
        Command::Generate(args) => commands::run_generate(&config, args),
        Command::Enhance(args) => commands::run_enhance(&config, args),
        Command::Bulk(args) => commands::run_bulk(&config, args),
        Command::Validate(args) => commands::run_validate(&config, args),
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
