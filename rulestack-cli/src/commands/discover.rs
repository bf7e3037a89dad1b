//! Discovery commands: featured, trending and recommend

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use rulestack::registry::{self, DEFAULT_RECOMMEND_LIMIT};

use crate::context::Workspace;
use crate::output::{print_template, rating_badge, FIRE, SPARKLE};

/// Which curated list to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Showcase {
    /// Editor picks, falling back to best rated
    Featured,
    /// Popular picks, falling back to most voted
    Trending,
}

/// Show featured or trending templates
#[derive(Debug)]
pub struct ShowcaseCommand {
    /// List to show
    pub kind: Showcase,
}

impl ShowcaseCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store, registry or ratings cannot be loaded.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let registry = workspace.load_registry()?;
        let ratings = workspace.load_ratings()?;

        let (heading, shown) = match self.kind {
            Showcase::Featured => (
                format!("{SPARKLE}Featured templates"),
                registry::featured(&registry, &ratings, &templates),
            ),
            Showcase::Trending => (
                format!("{FIRE}Trending templates"),
                registry::trending(&registry, &ratings, &templates),
            ),
        };

        println!("{}", style(heading).bold());
        println!();
        if shown.is_empty() {
            println!("  {}", style("Nothing to show yet").yellow());
            println!(
                "  Rate templates with {} to populate this list",
                style("rulestack rate <template> <1-5>").cyan()
            );
            return Ok(());
        }
        for template in shown {
            print_template(template, &ratings);
        }
        Ok(())
    }
}

/// Recommend templates for an existing project
#[derive(Debug, Args)]
pub struct RecommendCommand {
    /// Project directory to inspect
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Maximum number of recommendations
    #[arg(short, long, default_value_t = DEFAULT_RECOMMEND_LIMIT)]
    pub limit: usize,
}

impl RecommendCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the project manifests, store or ratings cannot be
    /// read.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let signals = registry::detect_stack(&self.path)
            .with_context(|| format!("Failed to inspect {}", self.path.display()))?;
        let templates = workspace.templates()?;
        let ratings = workspace.load_ratings()?;

        if signals.is_empty() {
            println!(
                "{}",
                style("No known stack detected; showing the best templates overall").dim()
            );
        } else {
            println!(
                "{} {}",
                style("Detected:").bold(),
                style(signals.join(", ")).cyan()
            );
        }
        println!();

        let ranked = registry::recommend(&templates, &signals, &ratings, self.limit);
        if ranked.is_empty() {
            println!("  {}", style("No templates found").yellow());
            return Ok(());
        }

        for (position, pick) in ranked.iter().enumerate() {
            let name = pick.template.display_name();
            let mut line = format!(
                "{} {}  {}",
                style(format!("{}.", position + 1)).dim(),
                style(&name).cyan().bold(),
                style(format!("quality {}", pick.quality)).dim()
            );
            if let Some(badge) = rating_badge(&ratings, &name) {
                line.push_str(&format!("  {}", style(badge).yellow()));
            }
            println!("  {line}");
            if !pick.matched.is_empty() {
                println!("     matches {}", style(pick.matched.join(", ")).green());
            }
        }
        Ok(())
    }
}
