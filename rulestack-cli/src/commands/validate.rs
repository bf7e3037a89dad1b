//! Validation commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use rulestack::prelude::*;
use rulestack::template::DESCRIPTOR_FILE;

use crate::context::Workspace;
use crate::output::{FAILURE, SUCCESS, WARNING};

/// Validate one template
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Template name, template directory, or path to a template.json
    pub template: String,
}

impl ValidateCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be found or loaded, or when it
    /// fails validation.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let template = resolve(workspace, &self.template)?;
        let result = workspace.validator().validate(&template);

        print_result(&result);

        if result.is_valid() {
            Ok(())
        } else {
            Err(rulestack::Error::Validation {
                name: result.name,
                errors: result.errors,
            }
            .into())
        }
    }
}

/// Load a template from a descriptor path, a template directory, or the store
fn resolve(workspace: &Workspace, target: &str) -> Result<Template> {
    let path = Path::new(target);
    let descriptor: Option<PathBuf> = if path.is_dir() {
        Some(path.join(DESCRIPTOR_FILE))
    } else if path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    };

    match descriptor {
        Some(descriptor) => TemplateStore::load_descriptor(&descriptor)
            .with_context(|| format!("Failed to load {}", descriptor.display())),
        None => workspace
            .store
            .find(target)
            .with_context(|| format!("No template or descriptor named '{target}'")),
    }
}

fn print_result(result: &ValidationResult) {
    if result.is_valid() {
        println!(
            "{}{} {}",
            SUCCESS,
            style(&result.name).cyan().bold(),
            style("is valid").green()
        );
    } else {
        println!(
            "{}{} {}",
            FAILURE,
            style(&result.name).cyan().bold(),
            style("is invalid").red()
        );
    }

    for error in &result.errors {
        println!("    {} {error}", style("error:").red().bold());
    }
    for warning in &result.warnings {
        println!("    {}{}", WARNING, style(warning).yellow());
    }
}

/// Validate every template and write a report
#[derive(Debug, Default)]
pub struct ValidateAllCommand;

impl ValidateAllCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be loaded, the report cannot be
    /// written, or any template is invalid.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let report = ValidationReport::from_templates(&workspace.validator(), &templates);

        for result in &report.results {
            print_result(result);
        }

        let path = report
            .write_to(&workspace.report_dir())
            .context("Failed to write validation report")?;

        println!();
        println!(
            "{} valid, {} invalid, {} warnings",
            style(report.valid).green().bold(),
            style(report.invalid).red().bold(),
            style(report.warnings).yellow().bold()
        );
        println!("Report written to {}", style(path.display()).dim());

        if !report.all_valid() {
            anyhow::bail!("{} of {} templates failed validation", report.invalid, report.total);
        }
        Ok(())
    }
}
