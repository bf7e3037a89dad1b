//! Writing templates into project directories
//!
//! Materializing a template writes each declared file verbatim under the
//! target directory and then records the template and version in a marker
//! file (`.rulestack.json`). Every path is checked before the first write; a
//! write failure stops the run and reports the files already written.

mod update;

pub use update::{
    apply_update, plan_update, preview, FileChange, FilePreview, UpdatePlan, UpdateReport,
    UpdateStatus,
};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::json::{read_json, write_json};
use crate::template::Template;

/// Marker file name inside a materialized project
pub const MARKER_FILE: &str = ".rulestack.json";

/// Records which template produced a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMarker {
    /// Template name
    pub template: String,
    /// Template version applied last
    pub version: String,
    /// First materialization time
    pub installed_at: DateTime<Utc>,
    /// Project name given at init
    pub project_name: String,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProjectMarker {
    /// Marker location for `project`
    #[must_use]
    pub fn path(project: &Path) -> PathBuf {
        project.join(MARKER_FILE)
    }

    /// Read the marker of `project`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMarker`] when the project has no marker, or a
    /// read/parse error.
    pub fn load(project: &Path) -> Result<Self> {
        let path = Self::path(project);
        read_json(&path)?.ok_or(Error::MissingMarker(path))
    }

    /// Write the marker into `project`
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    pub fn save(&self, project: &Path) -> Result<PathBuf> {
        let path = Self::path(project);
        write_json(&path, self, "project marker")?;
        Ok(path)
    }
}

/// What a materialization wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Target directory
    pub target: PathBuf,
    /// Files written, relative to `target`, in template order
    pub files: Vec<PathBuf>,
    /// Marker location
    pub marker: PathBuf,
}

/// A template file resolved to a checked relative path
#[derive(Debug, Clone)]
pub(crate) struct PlannedFile<'a> {
    pub(crate) relative: PathBuf,
    pub(crate) content: &'a str,
}

/// Reject absolute paths and anything that climbs out of the target
pub(crate) fn safe_relative(raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath(raw.to_string()));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(Error::UnsafePath(raw.to_string()));
    }
    Ok(clean)
}

/// Check every declared file before anything touches the disk
pub(crate) fn plan_files(template: &Template) -> Result<Vec<PlannedFile<'_>>> {
    let Some(files) = template.files() else {
        return Ok(Vec::new());
    };

    let mut planned = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let (Some(raw), Some(content)) = (file.path(), file.content()) else {
            let missing: Vec<&str> = [
                file.path().is_none().then_some("path"),
                file.content().is_none().then_some("content"),
            ]
            .into_iter()
            .flatten()
            .collect();
            return Err(Error::Validation {
                name: template.display_name(),
                errors: vec![format!(
                    "File entry {index} is missing {}",
                    missing.join(" and ")
                )],
            });
        };

        let relative = safe_relative(raw)?;
        if relative == Path::new(MARKER_FILE) {
            return Err(Error::UnsafePath(raw.to_string()));
        }
        planned.push(PlannedFile { relative, content });
    }
    Ok(planned)
}

/// Write one file, creating its parent directories
pub(crate) fn write_file(target: &Path, file: &PlannedFile<'_>) -> Result<()> {
    let path = target.join(&file.relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| Error::io("create directory", parent, err))?;
    }
    fs::write(&path, file.content).map_err(|err| Error::io("write", &path, err))?;
    debug!(path = %path.display(), bytes = file.content.len(), "wrote file");
    Ok(())
}

/// Wrap a failure with the list of files already on disk
pub(crate) fn partial(written: &[PathBuf], err: Error) -> Error {
    if written.is_empty() {
        return err;
    }
    Error::Materialize {
        written: written.iter().map(|p| p.display().to_string()).collect(),
        source: Box::new(err),
    }
}

/// Writes templates into directories
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer;

impl Materializer {
    /// Write every file of `template` under `target`, then the marker
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsafePath`] before writing anything when a path is
    /// absolute or contains `..`. A failed write stops the run; the error
    /// lists the files already written and no marker is created.
    pub fn materialize(
        &self,
        template: &Template,
        target: &Path,
        project_name: &str,
    ) -> Result<MaterializeReport> {
        self.materialize_at(template, target, project_name, Utc::now())
    }

    /// [`materialize`](Self::materialize) with an explicit timestamp
    ///
    /// # Errors
    ///
    /// See [`materialize`](Self::materialize).
    pub fn materialize_at(
        &self,
        template: &Template,
        target: &Path,
        project_name: &str,
        now: DateTime<Utc>,
    ) -> Result<MaterializeReport> {
        let planned = plan_files(template)?;

        fs::create_dir_all(target).map_err(|err| Error::io("create directory", target, err))?;

        let mut written = Vec::with_capacity(planned.len());
        for file in &planned {
            write_file(target, file).map_err(|err| partial(&written, err))?;
            written.push(file.relative.clone());
        }

        let marker = ProjectMarker {
            template: template.display_name(),
            version: template.version().unwrap_or_default().to_string(),
            installed_at: now,
            project_name: project_name.to_string(),
            updated_at: None,
            extra: BTreeMap::new(),
        };
        let marker_path = marker.save(target).map_err(|err| partial(&written, err))?;

        info!(
            template = %marker.template,
            target = %target.display(),
            files = written.len(),
            "materialized template"
        );

        Ok(MaterializeReport {
            target: target.to_path_buf(),
            files: written,
            marker: marker_path,
        })
    }
}
