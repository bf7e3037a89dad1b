//! Template store
//!
//! A store is a directory whose immediate subdirectories each hold at most one
//! `template.json` descriptor:
//!
//! ```text
//! templates/
//! ├── react-typescript-vite/template.json
//! ├── vue3-typescript-vite/template.json
//! └── scratch/            # no descriptor, ignored
//! ```
//!
//! Loading is tolerant: a descriptor that fails to parse is logged and skipped
//! so one broken template never hides the others.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::json::write_json;
use crate::template::{Template, DESCRIPTOR_FILE};

/// Directory-backed template store
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    /// Create a store rooted at `root` (the directory does not need to exist yet)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Descriptor path for a template name
    #[must_use]
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(DESCRIPTOR_FILE)
    }

    /// Load every parseable template, in directory-name order
    ///
    /// # Errors
    ///
    /// Returns an error only if the root exists but cannot be listed.
    /// Individual malformed descriptors are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<Template>> {
        if !self.root.exists() {
            debug!(root = %self.root.display(), "template store does not exist yet");
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf);
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop detected"));
                Error::io("list", path, source)
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }

            let descriptor = entry.path().join(DESCRIPTOR_FILE);
            if !descriptor.is_file() {
                debug!(dir = %entry.path().display(), "no descriptor, skipping");
                continue;
            }

            match Self::load_descriptor(&descriptor) {
                Ok(template) => templates.push(template),
                Err(err) => warn!(error = %err, "skipping template"),
            }
        }

        debug!(count = templates.len(), root = %self.root.display(), "loaded templates");
        Ok(templates)
    }

    /// Load one descriptor file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_descriptor(path: &Path) -> Result<Template> {
        let raw = fs::read_to_string(path).map_err(|err| Error::io("read", path, err))?;
        let mut template: Template =
            serde_json::from_str(&raw).map_err(|err| Error::parse(path, err))?;
        template.source_dir = path.parent().map(Path::to_path_buf);
        Ok(template)
    }

    /// Find a template by name
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no template answers to `name`.
    pub fn find(&self, name: &str) -> Result<Template> {
        self.load_all()?
            .into_iter()
            .find(|template| template.answers_to(name))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Whether a template directory or descriptor already uses `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    pub fn contains(&self, name: &str) -> Result<bool> {
        if self.root.join(name).exists() {
            return Ok(true);
        }
        Ok(self.load_all()?.iter().any(|t| t.answers_to(name)))
    }

    /// Write a template descriptor under `<root>/<name>/template.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the template has no name or the write fails.
    pub fn save(&self, template: &Template) -> Result<PathBuf> {
        let name = template.name_opt().ok_or_else(|| Error::Validation {
            name: template.display_name(),
            errors: vec!["Missing required field: name".to_string()],
        })?;
        let path = self.descriptor_path(name);
        write_json(&path, template, "template descriptor")?;
        info!(template = name, path = %path.display(), "saved template");
        Ok(path)
    }
}
