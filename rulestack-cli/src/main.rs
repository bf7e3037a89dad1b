//! rulestack CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rulestack::observability::{self, ObservabilityConfig};
use rulestack_cli::commands::{
    CategoriesCommand, CreateCommand, ImportCommand, InitCommand, ListCommand, QualityCommand,
    RateCommand, RecommendCommand, SearchCommand, Showcase, ShowcaseCommand, UpdateCommand,
    ValidateAllCommand, ValidateCommand,
};
use rulestack_cli::Workspace;

#[derive(Parser)]
#[command(name = "rulestack")]
#[command(version)]
#[command(about = "Manage AI-assistant project templates", long_about = None)]
struct Cli {
    /// Installation root (overrides configuration)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Extra configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    List(ListCommand),
    /// Search templates by keyword
    Search(SearchCommand),
    /// Show categories with template counts
    Categories,
    /// Validate one template
    Validate(ValidateCommand),
    /// Validate every template and write a report
    ValidateAll,
    /// Score template quality
    Quality(QualityCommand),
    /// Rate a template from 1 to 5
    Rate(RateCommand),
    /// Show featured templates
    Featured,
    /// Show trending templates
    Trending,
    /// Recommend templates for an existing project
    Recommend(RecommendCommand),
    /// Import a GitHub repository as a template
    Import(ImportCommand),
    /// Create a project from a template
    Init(InitCommand),
    /// Update a project to the latest template version
    Update(UpdateCommand),
    /// Create a new template
    Create(CreateCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init(ObservabilityConfig {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        json: cli.log_json,
    })?;

    let workspace = Workspace::load(cli.root, cli.config.as_deref())?;
    tracing::debug!(root = %workspace.settings.root.display(), "resolved workspace");

    match cli.command {
        Commands::List(cmd) => cmd.execute(&workspace)?,
        Commands::Search(cmd) => cmd.execute(&workspace)?,
        Commands::Categories => CategoriesCommand.execute(&workspace)?,
        Commands::Validate(cmd) => cmd.execute(&workspace)?,
        Commands::ValidateAll => ValidateAllCommand.execute(&workspace)?,
        Commands::Quality(cmd) => cmd.execute(&workspace)?,
        Commands::Rate(cmd) => cmd.execute(&workspace)?,
        Commands::Featured => ShowcaseCommand {
            kind: Showcase::Featured,
        }
        .execute(&workspace)?,
        Commands::Trending => ShowcaseCommand {
            kind: Showcase::Trending,
        }
        .execute(&workspace)?,
        Commands::Recommend(cmd) => cmd.execute(&workspace)?,
        Commands::Import(cmd) => cmd.execute(&workspace)?,
        Commands::Init(cmd) => cmd.execute(&workspace)?,
        Commands::Update(cmd) => cmd.execute(&workspace)?,
        Commands::Create(cmd) => cmd.execute(&workspace)?,
    }

    Ok(())
}
