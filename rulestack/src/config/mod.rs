//! Configuration management for rulestack
//!
//! Settings are loaded from several sources, later ones overriding earlier:
//!
//! 1. Hardcoded defaults (fallback)
//! 2. `~/.config/rulestack/config.toml` (user config, XDG)
//! 3. `./rulestack.toml` (project-local)
//! 4. An explicit file passed with `--config`
//! 5. Environment variables (highest priority, `RULESTACK_` prefix)
//!
//! # Example Configuration
//!
//! ```toml
//! # rulestack.toml
//! root = "/opt/rulestack"
//! templates_dir = "templates"
//! registry_file = "registry.json"
//! ratings_file = "ratings.json"
//! report_dir = "reports"
//! min_cursorrules_length = 100
//! ```
//!
//! Relative paths resolve against `root`.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::DEFAULT_MIN_CURSORRULES_LENGTH;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RULESTACK_";

/// Project-local configuration file
pub const LOCAL_CONFIG_FILE: &str = "rulestack.toml";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Installation root holding the store, registry, ratings and reports
    pub root: PathBuf,

    /// Template store directory
    pub templates_dir: PathBuf,

    /// Registry document
    pub registry_file: PathBuf,

    /// Ratings document
    pub ratings_file: PathBuf,

    /// Directory reports are written to
    pub report_dir: PathBuf,

    /// `.cursorrules` length below which validation warns
    pub min_cursorrules_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            templates_dir: PathBuf::from("templates"),
            registry_file: PathBuf::from("registry.json"),
            ratings_file: PathBuf::from("ratings.json"),
            report_dir: PathBuf::from("reports"),
            min_cursorrules_length: DEFAULT_MIN_CURSORRULES_LENGTH,
        }
    }
}

impl Settings {
    /// Load settings from every source, with an optional explicit file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if:
    /// - Default settings cannot be serialized to TOML
    /// - A configuration file contains invalid TOML
    /// - A value has the wrong type
    /// - The explicit file does not exist
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Self::defaults()?;

        let user_config = Self::user_config_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "configuration file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        Ok(figment.extract()?)
    }

    fn defaults() -> Result<Figment> {
        let defaults = toml::to_string(&Self::default())
            .map_err(|err| Error::Config(format!("cannot serialize defaults: {err}")))?;
        Ok(Figment::new().merge(Toml::string(&defaults)))
    }

    /// XDG user configuration path
    #[must_use]
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(LOCAL_CONFIG_FILE),
            |config_dir| config_dir.join("rulestack").join("config.toml"),
        )
    }

    /// Replace the root, as `--root` does
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Template store directory
    #[must_use]
    pub fn templates_path(&self) -> PathBuf {
        self.resolve(&self.templates_dir)
    }

    /// Registry document path
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.resolve(&self.registry_file)
    }

    /// Ratings document path
    #[must_use]
    pub fn ratings_path(&self) -> PathBuf {
        self.resolve(&self.ratings_file)
    }

    /// Report directory
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.resolve(&self.report_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.root, PathBuf::from("."));
        assert_eq!(settings.min_cursorrules_length, 100);
        assert_eq!(settings.templates_path(), PathBuf::from("./templates"));
        assert_eq!(settings.report_path(), PathBuf::from("./reports"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rulestack.toml");
        fs::write(&path, "root = \"/srv/rules\"\nmin_cursorrules_length = 250\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.root, PathBuf::from("/srv/rules"));
        assert_eq!(settings.min_cursorrules_length, 250);
        assert_eq!(settings.registry_file, PathBuf::from("registry.json"));
        assert_eq!(settings.registry_path(), PathBuf::from("/srv/rules/registry.json"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rulestack.toml");
        fs::write(&path, "min_cursorrules_length = \"lots\"\n").unwrap();
        assert!(matches!(Settings::load(Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = Settings::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let settings = Settings {
            ratings_file: PathBuf::from("/var/lib/rulestack/ratings.json"),
            ..Settings::default()
        }
        .with_root("/elsewhere");
        assert_eq!(
            settings.ratings_path(),
            PathBuf::from("/var/lib/rulestack/ratings.json")
        );
        assert_eq!(settings.templates_path(), PathBuf::from("/elsewhere/templates"));
    }
}
