//! Resolved installation paths shared by every command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rulestack::prelude::*;

/// Everything a command needs to reach the installation root
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Effective settings
    pub settings: Settings,
    /// Template store
    pub store: TemplateStore,
    /// Registry document
    pub registry: RegistryFile,
    /// Ratings document
    pub ratings: RatingFile,
}

impl Workspace {
    /// Build a workspace from already-loaded settings
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            store: TemplateStore::new(settings.templates_path()),
            registry: RegistryFile::new(settings.registry_path()),
            ratings: RatingFile::new(settings.ratings_path()),
            settings,
        }
    }

    /// Load settings from all sources, then apply `--root`
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load(root: Option<PathBuf>, config: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::load(config).context("Failed to load configuration")?;
        if let Some(root) = root {
            settings = settings.with_root(root);
        }
        Ok(Self::new(settings))
    }

    /// Every parseable template in the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be listed.
    pub fn templates(&self) -> Result<Vec<Template>> {
        self.store.load_all().with_context(|| {
            format!(
                "Failed to load templates from {}",
                self.store.root().display()
            )
        })
    }

    /// Validator configured from settings
    #[must_use]
    pub const fn validator(&self) -> Validator {
        Validator::new(self.settings.min_cursorrules_length)
    }

    /// Report output directory
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.settings.report_path()
    }

    /// Load the registry document, creating it with the default taxonomy
    /// on first access
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid or cannot be created.
    pub fn load_registry(&self) -> Result<Registry> {
        self.registry
            .load_or_init()
            .with_context(|| format!("Failed to load registry {}", self.registry.path().display()))
    }

    /// Load the ratings document
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but is invalid.
    pub fn load_ratings(&self) -> Result<RatingBook> {
        self.ratings
            .load()
            .with_context(|| format!("Failed to load ratings {}", self.ratings.path().display()))
    }
}
