//! rulestack: a local template manager for AI-assisted projects
//!
//! A template bundles AI-assistant configuration (`.cursorrules` and a
//! structured `rules` block), the files to scaffold and the developer commands
//! of a project stack. This crate holds the core:
//!
//! - [`store`]: a directory of `template.json` descriptors
//! - [`validation`]: structural checks with errors and warnings
//! - [`quality`]: a 0–100 score with a letter grade
//! - [`registry`]: categories, search, featured/trending, import, recommend
//! - [`rating`]: running-mean ratings and reviews
//! - [`materialize`]: writing a template into a project and updating it later
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rulestack::prelude::*;
//!
//! # fn main() -> rulestack::Result<()> {
//! let settings = Settings::load(None)?;
//! let store = TemplateStore::new(settings.templates_path());
//! let templates = store.load_all()?;
//!
//! let registry = RegistryFile::new(settings.registry_path()).load()?;
//! for template in registry.search(&templates, "react", Some("frontend"))? {
//!     let score = QualityScorer.score(template);
//!     println!("{} {} ({})", template.name(), score.score, score.grade);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod materialize;
pub mod observability;
pub mod quality;
pub mod rating;
pub mod registry;
pub mod store;
pub mod template;
pub mod validation;

mod json;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::error::{Error, Result};
    pub use crate::materialize::{
        apply_update, plan_update, preview, FileChange, Materializer, ProjectMarker,
        UpdateStatus, MARKER_FILE,
    };
    pub use crate::quality::{Grade, QualityReport, QualityScore, QualityScorer};
    pub use crate::rating::{RatingBook, RatingFile};
    pub use crate::registry::{Registry, RegistryFile};
    pub use crate::store::TemplateStore;
    pub use crate::template::{Rules, Style, Template, TemplateFile};
    pub use crate::validation::{ValidationReport, ValidationResult, Validator};
}
