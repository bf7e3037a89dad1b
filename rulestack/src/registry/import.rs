//! Importing external repositories as placeholder templates

use std::collections::BTreeMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use super::{ImportRecord, Registry};
use crate::error::{Error, Result};
use crate::store::TemplateStore;
use crate::template::{to_kebab_name, Rules, Template, TemplateFile, CURSORRULES_PATH};

static REPO_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:git@github\.com:|(?:https?://)?(?:www\.)?github\.com/)?([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$",
    )
    .expect("valid repository regex")
});

/// Owner and repository extracted from an import identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSource {
    /// Repository owner
    pub owner: String,
    /// Repository name without `.git`
    pub repo: String,
}

/// Parse `owner/repo`, `github.com/owner/repo`, an HTTPS URL or an SSH remote
///
/// # Errors
///
/// Returns [`Error::InvalidSource`] when no owner/repo pair can be extracted.
pub fn parse_source(identifier: &str) -> Result<RepoSource> {
    let trimmed = identifier.trim();
    REPO_SOURCE
        .captures(trimmed)
        .and_then(|caps| {
            let owner = caps.get(1)?.as_str();
            let repo = caps.get(2)?.as_str();
            (!owner.starts_with('.') && !repo.is_empty() && repo != "." && repo != "..").then(|| {
                RepoSource {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                }
            })
        })
        .ok_or_else(|| Error::InvalidSource(identifier.to_string()))
}

fn placeholder(source: &RepoSource, identifier: &str, name: String) -> Template {
    let cursorrules = format!(
        "# {repo}\n\nYou are working on a project based on the {owner}/{repo} repository.\n\n\
         This template was imported from {identifier}. Replace this file with the\n\
         repository's own AI-assistant guidance.\n",
        repo = source.repo,
        owner = source.owner,
    );

    Template {
        name: Some(name),
        description: Some(format!(
            "Imported from github.com/{}/{}",
            source.owner, source.repo
        )),
        version: Some("1.0.0".to_string()),
        tags: Some(vec!["external".to_string(), "github".to_string()]),
        author: Some(source.owner.clone()),
        rules: Some(Rules {
            context: Some(format!(
                "Project based on the {}/{} repository",
                source.owner, source.repo
            )),
            ..Rules::default()
        }),
        files: Some(vec![TemplateFile::new(CURSORRULES_PATH, cursorrules)]),
        commands: Some(BTreeMap::new()),
        ..Template::default()
    }
}

impl Registry {
    /// Create a placeholder template for an external repository
    ///
    /// The template is saved into `store` and recorded in `imported`; the
    /// caller persists the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSource`] for an unparseable identifier,
    /// [`Error::AlreadyExists`] when the derived name is taken, or an I/O error
    /// if the descriptor cannot be written.
    pub fn import_external(&mut self, store: &TemplateStore, identifier: &str) -> Result<Template> {
        let source = parse_source(identifier)?;
        let name = to_kebab_name(&source.repo);
        if name.is_empty() {
            return Err(Error::InvalidSource(identifier.to_string()));
        }
        if store.contains(&name)? {
            return Err(Error::AlreadyExists(name));
        }

        let template = placeholder(&source, identifier.trim(), name.clone());
        store.save(&template)?;

        self.imported.insert(
            name.clone(),
            ImportRecord {
                source: identifier.trim().to_string(),
                owner: source.owner,
                repo: source.repo,
                imported_at: Utc::now(),
            },
        );
        info!(template = %name, source = identifier, "imported template");
        Ok(template)
    }
}
