//! Import command

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use crate::context::Workspace;
use crate::output::SUCCESS;

/// Import a GitHub repository as a placeholder template
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// `owner/repo`, `github.com/owner/repo`, an HTTPS URL or `git@github.com:owner/repo`
    pub source: String,
}

impl ImportCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed, a template with the
    /// derived name exists, or the store or registry cannot be written.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let mut registry = workspace.load_registry()?;
        let template = registry
            .import_external(&workspace.store, &self.source)
            .with_context(|| format!("Failed to import '{}'", self.source))?;
        workspace
            .registry
            .save(&registry)
            .context("Failed to save registry")?;

        let name = template.display_name();
        println!(
            "{}Imported {} as {}",
            SUCCESS,
            style(&self.source).dim(),
            style(&name).cyan().bold()
        );
        println!();
        println!(
            "  Edit {} to flesh it out, then run {}",
            style(workspace.store.descriptor_path(&name).display()).dim(),
            style(format!("rulestack validate {name}")).cyan()
        );
        Ok(())
    }
}
