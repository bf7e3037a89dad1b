//! List and search commands

use anyhow::Result;
use clap::Args;
use console::style;

use crate::context::Workspace;
use crate::output::print_template;

/// List available templates
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show templates in this category
    #[arg(short, long)]
    pub category: Option<String>,
}

impl ListCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store or registry cannot be loaded, or the
    /// category is unknown.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let registry = workspace.load_registry()?;
        let ratings = workspace.load_ratings()?;

        let shown = registry.search(&templates, "", self.category.as_deref())?;

        let heading = self.category.as_ref().map_or_else(
            || "Available templates".to_string(),
            |category| format!("Templates in {category}"),
        );
        println!("{} {}", style(heading).bold(), style(format!("({})", shown.len())).dim());
        println!();

        if shown.is_empty() {
            println!("  {}", style("No templates found").yellow());
            return Ok(());
        }
        for template in shown {
            print_template(template, &ratings);
        }
        Ok(())
    }
}

/// Search templates by keyword
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text matched against names, descriptions and tags
    pub query: String,

    /// Only search within this category
    #[arg(short, long)]
    pub category: Option<String>,
}

impl SearchCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store or registry cannot be loaded, or the
    /// category is unknown.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let registry = workspace.load_registry()?;
        let ratings = workspace.load_ratings()?;

        let hits = registry.search(&templates, &self.query, self.category.as_deref())?;

        println!(
            "{} {} {}",
            style("Results for").bold(),
            style(format!("\"{}\"", self.query)).cyan(),
            style(format!("({})", hits.len())).dim()
        );
        println!();

        if hits.is_empty() {
            println!("  {}", style("No templates match your search").yellow());
            println!(
                "  Try {} to see everything",
                style("rulestack list").cyan()
            );
            return Ok(());
        }
        for template in hits {
            print_template(template, &ratings);
        }
        Ok(())
    }
}

/// Show the category taxonomy with template counts
#[derive(Debug, Default)]
pub struct CategoriesCommand;

impl CategoriesCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store or registry cannot be loaded.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let registry = workspace.load_registry()?;

        println!("{}", style("Categories").bold());
        println!();
        for (category, count) in registry.category_counts(&templates) {
            let seeds = registry
                .categories
                .get(&category)
                .map(|seeds| seeds.join(", "))
                .unwrap_or_default();
            println!(
                "  {:<12} {:>3}  {}",
                style(&category).cyan().bold(),
                count,
                style(seeds).dim()
            );
        }
        Ok(())
    }
}
