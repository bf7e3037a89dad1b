//! Error types and error handling

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure while performing `operation` on `path`
    #[error("Failed to {operation} {}: {source}", .path.display())]
    Io {
        /// What was being attempted ("read", "write", "create directory", ...)
        operation: &'static str,
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed into its schema
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        /// Offending document
        path: PathBuf,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        /// Document being serialized
        what: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Template validation failed
    #[error("Template '{name}' is invalid: {}", .errors.join("; "))]
    Validation {
        /// Template name
        name: String,
        /// Fatal validation errors
        errors: Vec<String>,
    },

    /// Rating outside the accepted range
    #[error("Rating must be between 1 and 5, got {0}")]
    Range(i64),

    /// Unknown template
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Unknown category
    #[error("Unknown category '{name}'. Known categories: {}", .known.join(", "))]
    UnknownCategory {
        /// Requested category
        name: String,
        /// Categories defined by the registry
        known: Vec<String>,
    },

    /// Import identifier without an owner/repo pair
    #[error("Cannot parse '{0}' as a repository (expected owner/repo or a GitHub URL)")]
    InvalidSource(String),

    /// A template with this name already exists
    #[error("Template '{0}' already exists")]
    AlreadyExists(String),

    /// A template file path would escape the target directory
    #[error("Refusing to write '{0}': path must be relative and stay inside the target directory")]
    UnsafePath(String),

    /// Materialization stopped part way through
    #[error("Stopped after writing {} file(s) ({}): {source}", .written.len(), .written.join(", "))]
    Materialize {
        /// Files already written before the failure
        written: Vec<String>,
        /// The failure that stopped the run
        #[source]
        source: Box<Error>,
    },

    /// Project directory has no marker
    #[error("No template marker found at {}. Was this project created with `rulestack init`?", .0.display())]
    MissingMarker(PathBuf),

    /// Version string is not a semantic version triple
    #[error("Invalid version '{version}' for template '{name}'")]
    InvalidVersion {
        /// Template name
        name: String,
        /// Offending version string
        version: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an [`Error::Io`] for `path`
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build an [`Error::Parse`] for `path`
    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = Error::io(
            "write",
            "/tmp/out/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("write"));
        assert!(message.contains("/tmp/out/a.txt"));
    }

    #[test]
    fn test_validation_error_lists_errors() {
        let err = Error::Validation {
            name: "demo".to_string(),
            errors: vec!["Missing version".to_string(), "Missing rules".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Template 'demo' is invalid: Missing version; Missing rules"
        );
    }
}
