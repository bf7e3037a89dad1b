//! Template creation wizard

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use rulestack::prelude::*;
use rulestack::template::{to_kebab_name, StyleFields, CURSORRULES_PATH};

use crate::context::Workspace;
use crate::output::SUCCESS;

/// Language and commands for a framework
struct FrameworkProfile {
    language: &'static str,
    install: &'static str,
    dev: &'static str,
    preferences: &'static [&'static str],
}

const NODE_PREFERENCES: &[&str] = &[
    "Use TypeScript strict mode",
    "Prefer small, focused modules",
];

fn profile(framework: &str) -> FrameworkProfile {
    match framework {
        "django" | "fastapi" => FrameworkProfile {
            language: "python",
            install: "pip install -r requirements.txt",
            dev: if framework == "django" {
                "python manage.py runserver"
            } else {
                "uvicorn main:app --reload"
            },
            preferences: &["Use type hints", "Follow PEP 8"],
        },
        "flutter" => FrameworkProfile {
            language: "dart",
            install: "flutter pub get",
            dev: "flutter run",
            preferences: &["Prefer stateless widgets", "Keep widgets small"],
        },
        "rust" | "tauri" => FrameworkProfile {
            language: "rust",
            install: "cargo build",
            dev: "cargo run",
            preferences: &["Propagate errors with ?", "Keep modules small"],
        },
        _ => FrameworkProfile {
            language: "typescript",
            install: "npm install",
            dev: "npm run dev",
            preferences: NODE_PREFERENCES,
        },
    }
}

/// Answers collected from flags or prompts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateAnswers {
    /// Template name, normalized to kebab-case
    pub name: String,
    /// One-line description
    pub description: String,
    /// Tags
    pub tags: Vec<String>,
    /// Author
    pub author: Option<String>,
    /// Main framework, e.g. `react`
    pub framework: Option<String>,
}

/// Synthesize a complete descriptor from wizard answers
#[must_use]
pub fn build_template(answers: &CreateAnswers) -> Template {
    let name = to_kebab_name(&answers.name);
    let framework = answers
        .framework
        .as_deref()
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());
    let stack = framework.clone().unwrap_or_else(|| "general".to_string());
    let profile = profile(&stack);

    let mut tags: Vec<String> = answers
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if let Some(framework) = &framework {
        if !tags.contains(framework) {
            tags.insert(0, framework.clone());
        }
    }
    if !tags.iter().any(|t| t == profile.language) {
        tags.push(profile.language.to_string());
    }

    let cursorrules = format!(
        "# {name}\n\n\
         You are an expert {stack} developer. Project context: {description}\n\n\
         ## Best Practices\n\n\
         - Write {language} that is easy to read and test\n\
         - Keep functions small and name things by what they do\n\
         - Handle errors explicitly; never swallow them\n\n\
         ## Example\n\n\
         ```\n{install}\n{dev}\n```\n",
        description = answers.description,
        language = profile.language,
        install = profile.install,
        dev = profile.dev,
    );

    Template {
        name: Some(name),
        description: Some(answers.description.trim().to_string()),
        version: Some("1.0.0".to_string()),
        tags: Some(tags),
        author: answers.author.clone().filter(|a| !a.trim().is_empty()),
        rules: Some(Rules {
            context: Some(format!(
                "You are an expert {stack} developer working on: {}",
                answers.description.trim()
            )),
            style: Some(Style::Fields(StyleFields {
                language: Some(profile.language.to_string()),
                framework,
                conventions: Some(serde_json::json!(["consistent formatting", "descriptive names"])),
                extra: BTreeMap::new(),
            })),
            restrictions: Some(vec![
                "Do not introduce new dependencies without asking".to_string(),
                "Do not leave commented-out code".to_string(),
            ]),
            preferences: Some(profile.preferences.iter().map(ToString::to_string).collect()),
            extra: BTreeMap::new(),
        }),
        files: Some(vec![TemplateFile::new(CURSORRULES_PATH, cursorrules)]),
        commands: Some(BTreeMap::from([
            ("install".to_string(), profile.install.to_string()),
            ("dev".to_string(), profile.dev.to_string()),
        ])),
        ..Template::default()
    }
}

/// Create a new template in the store
#[derive(Debug, Default, Args)]
pub struct CreateCommand {
    /// Template name (normalized to kebab-case)
    #[arg(short, long)]
    pub name: Option<String>,

    /// One-line description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Main framework (react, vue, django, ...)
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CreateCommand {
    /// Collect answers from flags, prompting for anything missing
    ///
    /// # Errors
    ///
    /// Returns an error when a required value is missing and there is no
    /// terminal to prompt on.
    pub fn answers(&self) -> Result<CreateAnswers> {
        if let (Some(name), Some(description)) = (&self.name, &self.description) {
            return Ok(CreateAnswers {
                name: name.clone(),
                description: description.clone(),
                tags: self.tags.clone(),
                author: self.author.clone(),
                framework: self.framework.clone(),
            });
        }

        if !console::user_attended() {
            anyhow::bail!(
                "Missing --name or --description and no terminal to prompt on. Pass both flags to run non-interactively."
            );
        }

        let theme = ColorfulTheme::default();
        let prompt = |label: &str, current: Option<&str>, allow_empty: bool| -> Result<String> {
            if let Some(value) = current {
                return Ok(value.to_string());
            }
            Input::<String>::with_theme(&theme)
                .with_prompt(label)
                .allow_empty(allow_empty)
                .interact_text()
                .with_context(|| format!("{label} prompt cancelled"))
        };

        let name = prompt("Template name", self.name.as_deref(), false)?;
        let description = prompt("Description", self.description.as_deref(), false)?;
        let framework = prompt("Framework (react, vue, django, ...)", self.framework.as_deref(), true)?;
        let author = prompt("Author", self.author.as_deref(), true)?;
        let tags = if self.tags.is_empty() {
            prompt("Tags (comma-separated)", None, true)?
                .split(',')
                .map(ToString::to_string)
                .collect()
        } else {
            self.tags.clone()
        };

        Ok(CreateAnswers {
            name,
            description,
            tags,
            author: Some(author).filter(|a| !a.trim().is_empty()),
            framework: Some(framework).filter(|f| !f.trim().is_empty()),
        })
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or taken, the prompt is
    /// cancelled, or the descriptor cannot be written.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let answers = self.answers()?;
        let template = build_template(&answers);
        let name = template.display_name();

        if template.name_opt().is_none() {
            anyhow::bail!("Template name '{}' has no usable characters", answers.name);
        }
        if workspace.store.contains(&name)? {
            return Err(rulestack::Error::AlreadyExists(name).into());
        }

        if !self.yes && console::user_attended() {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Create template {name}?"))
                .default(true)
                .interact()
                .context("Confirmation cancelled")?;
            if !proceed {
                anyhow::bail!("Aborted");
            }
        }

        let path = workspace
            .store
            .save(&template)
            .with_context(|| format!("Failed to save template '{name}'"))?;

        println!(
            "{}Created {} at {}",
            SUCCESS,
            style(&name).cyan().bold(),
            style(path.display()).dim()
        );
        println!();
        println!(
            "  Check it with {}",
            style(format!("rulestack quality --template {name}")).cyan()
        );
        Ok(())
    }
}
