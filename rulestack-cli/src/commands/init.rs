//! Project initialization command

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rulestack::prelude::*;

use crate::context::Workspace;
use crate::output::{PACKAGE, SUCCESS};

/// Create a project from a template
#[derive(Debug, Default, Args)]
pub struct InitCommand {
    /// Template to use
    #[arg(short, long)]
    pub template: Option<String>,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Target directory (defaults to ./<name>)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Run the template's install command afterwards
    #[arg(long)]
    pub install: bool,

    /// Write into a non-empty directory without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Where the template and project name came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitSelection {
    /// Both given on the command line
    ResolvedFromFlags {
        /// Template name
        template: String,
        /// Project name
        project: String,
    },
    /// At least one was asked for interactively
    ResolvedFromInteractivePrompt {
        /// Template name
        template: String,
        /// Project name
        project: String,
    },
}

impl InitSelection {
    /// Selected template name
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::ResolvedFromFlags { template, .. }
            | Self::ResolvedFromInteractivePrompt { template, .. } => template,
        }
    }

    /// Selected project name
    #[must_use]
    pub fn project(&self) -> &str {
        match self {
            Self::ResolvedFromFlags { project, .. }
            | Self::ResolvedFromInteractivePrompt { project, .. } => project,
        }
    }
}

impl InitCommand {
    /// Resolve template and project name, prompting for whatever is missing
    ///
    /// # Errors
    ///
    /// Returns an error when a value is missing and the terminal is not
    /// interactive, or when a prompt fails.
    pub fn selection(&self, templates: &[Template]) -> Result<InitSelection> {
        if let (Some(template), Some(project)) = (&self.template, &self.name) {
            return Ok(InitSelection::ResolvedFromFlags {
                template: template.clone(),
                project: project.trim().to_string(),
            });
        }

        if !console::user_attended() {
            anyhow::bail!(
                "Missing --template or --name and no terminal to prompt on. Pass both flags to run non-interactively."
            );
        }

        let theme = ColorfulTheme::default();
        let template = match &self.template {
            Some(template) => template.clone(),
            None => {
                if templates.is_empty() {
                    anyhow::bail!("No templates available. Create one with `rulestack create`.");
                }
                let items: Vec<String> = templates
                    .iter()
                    .map(|t| {
                        t.description().map_or_else(
                            || t.display_name(),
                            |d| format!("{} - {d}", t.display_name()),
                        )
                    })
                    .collect();
                let index = Select::with_theme(&theme)
                    .with_prompt("Template")
                    .items(&items)
                    .default(0)
                    .interact()
                    .context("Template selection cancelled")?;
                templates[index].display_name()
            }
        };

        let project = match &self.name {
            Some(project) => project.clone(),
            None => Input::<String>::with_theme(&theme)
                .with_prompt("Project name")
                .default("my-project".to_string())
                .interact_text()
                .context("Project name prompt cancelled")?,
        };

        Ok(InitSelection::ResolvedFromInteractivePrompt {
            template,
            project: project.trim().to_string(),
        })
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or invalid, the target
    /// directory is not empty and not confirmed, materialization fails, or
    /// the install command fails.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let templates = workspace.templates()?;
        let selection = self.selection(&templates)?;

        if selection.project().is_empty() {
            anyhow::bail!("Project name must not be empty");
        }

        let template = templates
            .iter()
            .find(|t| t.answers_to(selection.template()))
            .ok_or_else(|| rulestack::Error::NotFound(selection.template().to_string()))?;

        let result = workspace.validator().validate(template);
        if !result.is_valid() {
            return Err(rulestack::Error::Validation {
                name: result.name,
                errors: result.errors,
            }
            .into());
        }

        let target = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(selection.project()));
        self.confirm_target(&target)?;

        println!(
            "{} {} {} {}",
            style("Creating").green().bold(),
            style(selection.project()).cyan().bold(),
            style("from").dim(),
            style(template.display_name()).cyan()
        );
        println!();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message("Writing template files...");

        let written = Materializer.materialize(template, &target, selection.project());
        spinner.finish_and_clear();
        let report = written
            .with_context(|| format!("Failed to create project in {}", target.display()))?;

        println!(
            "{}{} files written to {}",
            SUCCESS,
            report.files.len(),
            style(target.display()).bold()
        );
        for file in &report.files {
            println!("    {}", style(file.display()).dim());
        }
        println!();

        if self.install {
            run_install(template, &target)?;
        }

        print_next_steps(template, &target, self.install);
        Ok(())
    }

    fn confirm_target(&self, target: &Path) -> Result<()> {
        if target.exists() && !target.is_dir() {
            anyhow::bail!("{} exists and is not a directory", target.display());
        }
        let occupied = target.is_dir()
            && fs::read_dir(target)
                .with_context(|| format!("Failed to read {}", target.display()))?
                .next()
                .is_some();
        if !occupied || self.yes {
            return Ok(());
        }

        if !console::user_attended() {
            anyhow::bail!(
                "Directory {} is not empty. Pass --yes to write into it anyway.",
                target.display()
            );
        }
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Directory {} is not empty. Existing files may be overwritten. Continue?",
                target.display()
            ))
            .default(false)
            .interact()
            .context("Confirmation cancelled")?;
        if !proceed {
            anyhow::bail!("Aborted");
        }
        Ok(())
    }
}

/// Platform shell invocation for a literal command string
fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Run `commands.install` inside the new project
fn run_install(template: &Template, target: &Path) -> Result<()> {
    let Some(install) = template.command("install") else {
        println!(
            "{}",
            style("Template has no install command, skipping install").yellow()
        );
        return Ok(());
    };

    println!("{}Running {}", PACKAGE, style(install).cyan());
    let status = shell(install)
        .current_dir(target)
        .status()
        .with_context(|| format!("Failed to start `{install}`"))?;

    if !status.success() {
        anyhow::bail!(
            "`{install}` exited with {status}. The project files are in place in {}",
            target.display()
        );
    }
    println!();
    Ok(())
}

fn print_next_steps(template: &Template, target: &Path, installed: bool) {
    println!("{}", style("Next steps:").bold());
    println!();
    println!(
        "  {} {}",
        style("$").dim(),
        style(format!("cd {}", target.display())).cyan()
    );
    if !installed {
        if let Some(install) = template.command("install") {
            println!("  {} {}", style("$").dim(), style(install).cyan());
        }
    }
    if let Some(dev) = template.command("dev") {
        println!("  {} {}", style("$").dim(), style(dev).cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_resolve_without_prompting() {
        let command = InitCommand {
            template: Some("react-typescript-vite".into()),
            name: Some(" my-app ".into()),
            ..InitCommand::default()
        };
        let selection = command.selection(&[]).unwrap();
        assert_eq!(
            selection,
            InitSelection::ResolvedFromFlags {
                template: "react-typescript-vite".into(),
                project: "my-app".into(),
            }
        );
        assert_eq!(selection.template(), "react-typescript-vite");
        assert_eq!(selection.project(), "my-app");
    }

    #[test]
    fn test_shell_runs_in_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let status = shell("echo ok > marker.txt")
            .current_dir(temp.path())
            .status()
            .unwrap();
        assert!(status.success());
        assert!(temp.path().join("marker.txt").exists());
    }
}
