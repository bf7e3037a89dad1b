//! Project update command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use rulestack::prelude::*;

use crate::context::Workspace;
use crate::output::SUCCESS;

/// Update a project to the latest version of its template
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Only report what would change
    #[arg(long)]
    pub check: bool,

    /// Apply even when the installed version is current
    #[arg(short, long)]
    pub force: bool,
}

impl UpdateCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the project has no marker, the template is gone
    /// from the store, a version is malformed, or a write fails.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let marker = ProjectMarker::load(&self.path)?;
        let template = workspace
            .store
            .find(&marker.template)
            .with_context(|| format!("Template '{}' is no longer in the store", marker.template))?;
        let plan = plan_update(&marker, &template, self.force)?;

        println!(
            "{} {} → {}",
            style(&plan.template).cyan().bold(),
            style(format!("v{}", plan.installed)).dim(),
            style(format!("v{}", plan.available)).bold()
        );

        match plan.status {
            UpdateStatus::UpToDate => {
                println!("{}{}", SUCCESS, style("Already up to date").green());
                println!("  Use {} to reapply the template", style("--force").cyan());
                return Ok(());
            }
            UpdateStatus::Available => println!("{}", style("Update available").yellow().bold()),
            UpdateStatus::Forced => println!("{}", style("Reapplying (forced)").yellow().bold()),
        }
        println!();

        if self.check {
            for row in preview(&template, &self.path)? {
                let label = match row.change {
                    FileChange::Added => style("added".to_string()).green(),
                    FileChange::Modified {
                        insertions,
                        deletions,
                    } => style(format!("modified (+{insertions} -{deletions})")).yellow(),
                    FileChange::Unchanged => style("unchanged".to_string()).dim(),
                };
                println!("  {:<40} {label}", row.path.display().to_string());
            }
            println!();
            println!("Run without {} to apply", style("--check").cyan());
            return Ok(());
        }

        let report = apply_update(&template, &self.path)
            .with_context(|| format!("Failed to update {}", self.path.display()))?;

        println!(
            "{}Updated {} files to v{}",
            SUCCESS,
            report.files.len(),
            report.marker.version
        );
        if !report.backups.is_empty() {
            println!("  Backups:");
            for backup in &report.backups {
                println!("    {}", style(backup.display()).dim());
            }
        }
        Ok(())
    }
}
