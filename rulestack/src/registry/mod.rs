//! Registry and discovery
//!
//! The registry is a small document layered over the template store. It owns
//! the category taxonomy, the curated featured and trending lists and the index
//! of imported templates. Templates themselves always come from the store.

mod discovery;
mod import;
mod recommend;

pub use discovery::{featured, trending, FEATURED_FALLBACK_LIMIT};
pub use import::{parse_source, RepoSource};
pub use recommend::{detect_stack, recommend, Recommendation, DEFAULT_RECOMMEND_LIMIT};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::json::{read_json, write_json};
use crate::template::Template;

/// Bucket for templates that match no named category
pub const OTHER_CATEGORY: &str = "Other";

/// Built-in category seeds
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("frontend", &["react", "vue", "angular", "svelte"]),
    ("backend", &["express", "fastapi", "django", "node", "python"]),
    ("mobile", &["react-native", "flutter", "mobile", "ios", "android"]),
    ("desktop", &["electron", "tauri", "desktop"]),
    ("fullstack", &["nextjs", "t3", "remix", "nuxt", "fullstack", "ssr"]),
];

fn default_categories() -> BTreeMap<String, Vec<String>> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, seeds)| {
            (
                (*name).to_string(),
                seeds.iter().map(ToString::to_string).collect(),
            )
        })
        .collect()
}

/// Where an imported template came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Identifier as given by the user
    pub source: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Import time
    pub imported_at: DateTime<Utc>,
}

/// The registry document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// Category name to seed keywords
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,
    /// Curated featured template names
    #[serde(default)]
    pub featured: Vec<String>,
    /// Curated trending template names
    #[serde(default)]
    pub trending: Vec<String>,
    /// Imported templates by name
    #[serde(default)]
    pub imported: BTreeMap<String, ImportRecord>,
    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            featured: Vec::new(),
            trending: Vec::new(),
            imported: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Registry {
    /// Category names in taxonomy order
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Seed keywords of a category, matched case-insensitively by name
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] listing the known categories.
    pub fn seeds(&self, category: &str) -> Result<&[String]> {
        let wanted = category.to_lowercase();
        self.categories
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, seeds)| seeds.as_slice())
            .ok_or_else(|| Error::UnknownCategory {
                name: category.to_string(),
                known: self.category_names(),
            })
    }

    /// Whether `template` belongs to a category with `seeds`
    #[must_use]
    pub fn in_category(template: &Template, seeds: &[String]) -> bool {
        template.tags().iter().any(|tag| {
            let tag = tag.to_lowercase();
            seeds.iter().any(|seed| tag.contains(&seed.to_lowercase()))
        })
    }

    /// Keyword search with an optional category filter
    ///
    /// A template matches when the lowercased query is a substring of its
    /// name, description or any tag. An exact (case-insensitive) name match
    /// sorts first; everything else keeps store order. An empty query matches
    /// every template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] for a category the registry does
    /// not define.
    pub fn search<'a>(
        &self,
        templates: &'a [Template],
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<&'a Template>> {
        let seeds = category.map(|c| self.seeds(c)).transpose()?;
        let query = query.trim().to_lowercase();

        let mut hits: Vec<&Template> = templates
            .iter()
            .filter(|template| matches_query(template, &query))
            .filter(|template| seeds.is_none_or(|seeds| Self::in_category(template, seeds)))
            .collect();

        if !query.is_empty() {
            hits.sort_by_key(|template| {
                template
                    .name_opt()
                    .is_none_or(|name| name.to_lowercase() != query)
            });
        }
        debug!(query = %query, category = ?category, hits = hits.len(), "search");
        Ok(hits)
    }

    /// Template count per category plus [`OTHER_CATEGORY`]
    ///
    /// Classification is non-exclusive: a template tagged `react` and `node`
    /// counts toward both frontend and backend.
    #[must_use]
    pub fn category_counts(&self, templates: &[Template]) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .categories
            .iter()
            .map(|(name, seeds)| {
                let count = templates
                    .iter()
                    .filter(|template| Self::in_category(template, seeds))
                    .count();
                (name.clone(), count)
            })
            .collect();

        let other = templates
            .iter()
            .filter(|template| {
                !self
                    .categories
                    .values()
                    .any(|seeds| Self::in_category(template, seeds))
            })
            .count();
        counts.push((OTHER_CATEGORY.to_string(), other));
        counts
    }
}

fn matches_query(template: &Template, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    template.name().to_lowercase().contains(query)
        || template
            .description()
            .is_some_and(|d| d.to_lowercase().contains(query))
        || template
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

/// Data-access object for the registry document
#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
}

impl RegistryFile {
    /// Registry document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry, falling back to the built-in taxonomy when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Registry> {
        if let Some(registry) = read_json(&self.path)? {
            return Ok(registry);
        }
        debug!(path = %self.path.display(), "no registry yet, using default taxonomy");
        Ok(Registry::default())
    }

    /// Load the registry, writing the default document first when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, parsed or created.
    pub fn load_or_init(&self) -> Result<Registry> {
        if self.path.exists() {
            return self.load();
        }
        let registry = Registry::default();
        self.save(&registry)?;
        Ok(registry)
    }

    /// Rewrite the whole document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        write_json(&self.path, registry, "registry")?;
        info!(path = %self.path.display(), "saved registry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn template(name: &str, description: &str, tags: &[&str]) -> Template {
        serde_json::from_value(json!({
            "name": name,
            "description": description,
            "tags": tags,
        }))
        .unwrap()
    }

    fn catalog() -> Vec<Template> {
        vec![
            template("react-typescript-vite", "React starter", &["react", "typescript", "vite"]),
            template("vue3-typescript-vite", "Vue starter", &["vue", "typescript", "vite"]),
            template("fastapi-service", "Python API", &["python", "fastapi"]),
            template("plain-notes", "Markdown notes", &["docs"]),
        ]
    }

    fn names(hits: &[&Template]) -> Vec<String> {
        hits.iter().map(|t| t.display_name()).collect()
    }

    #[test]
    fn test_search_by_tag() {
        let templates = catalog();
        let hits = Registry::default().search(&templates, "react", None).unwrap();
        assert_eq!(names(&hits), vec!["react-typescript-vite"]);
    }

    #[test]
    fn test_search_with_category() {
        let templates = catalog();
        let hits = Registry::default()
            .search(&templates, "vite", Some("frontend"))
            .unwrap();
        assert_eq!(names(&hits), vec!["react-typescript-vite", "vue3-typescript-vite"]);
    }

    #[test]
    fn test_search_matches_description_case_insensitively() {
        let templates = catalog();
        let hits = Registry::default().search(&templates, "MARKDOWN", None).unwrap();
        assert_eq!(names(&hits), vec!["plain-notes"]);
    }

    #[test]
    fn test_exact_name_match_sorts_first() {
        let templates = vec![
            template("vite-plugin-kit", "Uses vite", &["vite"]),
            template("vite", "The exact one", &["tooling"]),
            template("other-vite", "More vite", &[]),
        ];
        let hits = Registry::default().search(&templates, "Vite", None).unwrap();
        assert_eq!(names(&hits), vec!["vite", "vite-plugin-kit", "other-vite"]);
    }

    #[test]
    fn test_empty_query_keeps_store_order() {
        let mut templates = catalog();
        templates.insert(
            1,
            serde_json::from_value(json!({ "description": "Nameless", "tags": ["react"] }))
                .unwrap(),
        );

        let hits = Registry::default().search(&templates, "", None).unwrap();
        let descriptions: Vec<&str> = hits.iter().filter_map(|t| t.description()).collect();
        assert_eq!(
            descriptions,
            vec!["React starter", "Nameless", "Vue starter", "Python API", "Markdown notes"]
        );

        let hits = Registry::default().search(&templates, "  ", Some("frontend")).unwrap();
        assert_eq!(hits[0].name(), "react-typescript-vite");
        assert!(hits[1].name_opt().is_none());
    }

    #[test]
    fn test_unknown_category() {
        let templates = catalog();
        let err = Registry::default()
            .search(&templates, "", Some("embedded"))
            .unwrap_err();
        let Error::UnknownCategory { name, known } = err else {
            panic!("expected unknown category");
        };
        assert_eq!(name, "embedded");
        assert!(known.contains(&"frontend".to_string()));
    }

    #[test]
    fn test_category_counts_are_non_exclusive() {
        let mut templates = catalog();
        templates.push(template("mern", "Full stack", &["react", "node"]));
        let counts: BTreeMap<String, usize> = Registry::default()
            .category_counts(&templates)
            .into_iter()
            .collect();
        assert_eq!(counts["frontend"], 3);
        assert_eq!(counts["backend"], 2);
        assert_eq!(counts["mobile"], 0);
        assert_eq!(counts[OTHER_CATEGORY], 1);
    }

    #[test]
    fn test_custom_taxonomy_from_document() {
        let registry: Registry = serde_json::from_value(json!({
            "categories": { "docs": ["docs", "markdown"] }
        }))
        .unwrap();
        let templates = catalog();
        let hits = registry.search(&templates, "", Some("Docs")).unwrap();
        assert_eq!(names(&hits), vec!["plain-notes"]);
        assert!(registry.search(&templates, "", Some("frontend")).is_err());
    }

    #[test]
    fn test_registry_file_defaults_and_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = RegistryFile::new(temp.path().join("registry.json"));

        let registry = file.load().unwrap();
        assert_eq!(registry.categories.len(), DEFAULT_CATEGORIES.len());
        assert!(!file.path().exists());

        let mut registry = file.load_or_init().unwrap();
        assert!(file.path().exists());
        registry.featured.push("react-typescript-vite".to_string());
        file.save(&registry).unwrap();
        assert_eq!(file.load().unwrap(), registry);
    }
}
