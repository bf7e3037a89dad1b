//! Template validation
//!
//! Errors make a template invalid; warnings never do. Callers decide exit
//! status from [`ValidationResult::is_valid`] alone.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::json::write_json;
use crate::template::{is_semver_triple, Template};

/// File name of the validation report inside the report directory
pub const VALIDATION_REPORT_FILE: &str = "validation-report.json";

/// Default minimum `.cursorrules` length before a warning is raised
pub const DEFAULT_MIN_CURSORRULES_LENGTH: usize = 100;

/// Outcome of validating one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Template display name
    pub name: String,
    /// Fatal problems
    pub errors: Vec<String>,
    /// Advisory problems
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A template is valid when it has no errors, whatever its warnings
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Structural validator
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    min_cursorrules_length: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CURSORRULES_LENGTH)
    }
}

impl Validator {
    /// Create a validator with a custom `.cursorrules` length threshold
    #[must_use]
    pub const fn new(min_cursorrules_length: usize) -> Self {
        Self {
            min_cursorrules_length,
        }
    }

    /// Validate a template
    #[must_use]
    pub fn validate(&self, template: &Template) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if template.name_opt().is_none() {
            errors.push("Missing required field: name".to_string());
        }
        if template.description().is_none() {
            errors.push("Missing required field: description".to_string());
        }
        match template.version() {
            None => errors.push("Missing required field: version".to_string()),
            Some(version) if !is_semver_triple(version) => errors.push(format!(
                "Invalid version format '{version}' (expected MAJOR.MINOR.PATCH)"
            )),
            Some(_) => {}
        }

        match &template.rules {
            None => errors.push("Missing required field: rules".to_string()),
            Some(rules) => {
                if rules.context().is_none() {
                    warnings.push("Missing rules.context".to_string());
                }
                if rules.style.is_none() {
                    warnings.push("Missing rules.style".to_string());
                }
                if rules.restrictions().is_none() {
                    warnings.push("Missing rules.restrictions".to_string());
                }
                if rules.preferences().is_none() {
                    warnings.push("Missing rules.preferences".to_string());
                }
            }
        }

        if template.tags().is_empty() {
            warnings.push("No tags defined".to_string());
        }

        match template.files() {
            None => warnings.push("No files defined".to_string()),
            Some(files) => {
                for (index, file) in files.iter().enumerate() {
                    let missing: Vec<&str> = [
                        file.path().is_none().then_some("path"),
                        file.content().is_none().then_some("content"),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();

                    if !missing.is_empty() {
                        errors.push(format!(
                            "File entry {index} is missing {}",
                            missing.join(" and ")
                        ));
                    }
                }

                if let Some(rules_file) = template.cursorrules() {
                    let length = rules_file.content_len();
                    if length < self.min_cursorrules_length {
                        warnings.push(format!(
                            ".cursorrules is very short ({length} characters, recommended at least {})",
                            self.min_cursorrules_length
                        ));
                    }
                }
            }
        }

        if template.commands.is_none() {
            warnings.push("No commands defined".to_string());
        } else {
            if template.command("install").is_none() {
                warnings.push("Missing install command".to_string());
            }
            if template.command("dev").is_none() {
                warnings.push("Missing dev command".to_string());
            }
        }

        ValidationResult {
            name: template.display_name(),
            errors,
            warnings,
        }
    }
}

/// Summary document written by `validate-all`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Number of templates checked
    pub total: usize,
    /// Templates without errors
    pub valid: usize,
    /// Templates with at least one error
    pub invalid: usize,
    /// Total warnings across all templates
    pub warnings: usize,
    /// Per-template results, in store order
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// Build a report from individual results
    #[must_use]
    pub fn new(results: Vec<ValidationResult>) -> Self {
        let valid = results.iter().filter(|r| r.is_valid()).count();
        Self {
            generated_at: Utc::now(),
            total: results.len(),
            valid,
            invalid: results.len() - valid,
            warnings: results.iter().map(|r| r.warnings.len()).sum(),
            results,
        }
    }

    /// Validate every template with `validator`
    #[must_use]
    pub fn from_templates(validator: &Validator, templates: &[Template]) -> Self {
        Self::new(templates.iter().map(|t| validator.validate(t)).collect())
    }

    /// True when every template passed
    #[must_use]
    pub const fn all_valid(&self) -> bool {
        self.invalid == 0
    }

    /// Write the report as `validation-report.json` under `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(VALIDATION_REPORT_FILE);
        write_json(&path, self, "validation report")?;
        Ok(path)
    }
}
