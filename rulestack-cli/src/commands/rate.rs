//! Rating command

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use crate::context::Workspace;
use crate::output::{STAR, SUCCESS};

/// Rate a template from 1 to 5
#[derive(Debug, Args)]
pub struct RateCommand {
    /// Template name
    pub template: String,

    /// Rating, 1 to 5
    #[arg(allow_negative_numbers = true)]
    pub rating: i64,

    /// Optional review text
    #[arg(short, long)]
    pub comment: Option<String>,
}

impl RateCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for a rating outside 1..=5, an unknown template, or
    /// when the ratings document cannot be read or written.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let mut ratings = workspace.load_ratings()?;

        let record = ratings
            .add_rating(&templates, &self.template, self.rating, self.comment.as_deref())?
            .clone();
        workspace
            .ratings
            .save(&ratings)
            .context("Failed to save ratings")?;

        println!(
            "{}Rated {} {}",
            SUCCESS,
            style(&self.template).cyan().bold(),
            style(format!("{STAR} {}", self.rating)).yellow()
        );
        println!(
            "  Average {} from {} vote(s)",
            style(format!("{:.1}", record.rating)).bold(),
            record.votes
        );
        Ok(())
    }
}
