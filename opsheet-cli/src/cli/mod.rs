//! Command line interface

pub mod commands;
mod output;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::import::types::CandidateKey;

#[derive(Parser, Debug)]
#[command(name = "opsheet")]
#[command(about = "Bulk export and import of processor operations as TSV", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database file (overrides config and OPSHEET_DATABASE)
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List processors with their area and operation counts
    Processors,

    /// Write a processor's operations as TSV
    Export(ExportArgs),

    /// Check a TSV file without touching the database
    Validate(ValidateArgs),

    /// Reconcile a TSV file against a processor and apply it
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Processor to export (defaults to `default_processor` from config)
    #[arg(short, long)]
    pub processor: Option<String>,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// TSV file to check; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,

    /// Print the validation result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Processor to import into; created when missing
    #[arg(short, long)]
    pub processor: Option<String>,

    /// TSV file to import; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,

    /// Create every matched row as a new operation
    #[arg(long, conflicts_with = "update_all")]
    pub create_all: bool,

    /// Update every matched operation (the default)
    #[arg(long)]
    pub update_all: bool,

    /// Create this matched row as a new operation (repeatable)
    #[arg(long = "create", value_name = "GROUP/NAME")]
    pub create: Vec<CandidateKey>,

    /// Update the operation this row matches (repeatable)
    #[arg(long = "update", value_name = "GROUP/NAME")]
    pub update: Vec<CandidateKey>,

    /// Show the preview and stop
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the preview and summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run a parsed command line. Returns false when the command should exit
/// with a failure status without an error message of its own.
pub async fn run(cli: Cli) -> Result<bool> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    log::debug!("Using database {}", config.database_path.display());

    match cli.command {
        Commands::Processors => commands::processors::handle(&config).await.map(|_| true),
        Commands::Export(args) => commands::export::handle(&config, args).await.map(|_| true),
        Commands::Validate(args) => commands::validate::handle(args),
        Commands::Import(args) => commands::import::handle(&config, args).await,
    }
}

/// Processor from the flag, falling back to the configured default
fn resolve_processor(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| config.default_processor.clone())
        .context("No processor given. Use --processor or set default_processor in the config file")
}

/// Read a whole file, or stdin for `None` and `-`
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
