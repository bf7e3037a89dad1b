//! Updating materialized projects to a newer template version

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use similar::{ChangeTag, TextDiff};
use tracing::info;

use super::{partial, plan_files, write_file, ProjectMarker};
use crate::error::{Error, Result};
use crate::template::{parse_version, Template};

/// Outcome of comparing installed and available versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The store has a strictly newer version
    Available,
    /// Installed version is current (or newer than the store)
    UpToDate,
    /// Not newer, but the caller asked to apply anyway
    Forced,
}

/// Version comparison for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Template name
    pub template: String,
    /// Version recorded in the marker
    pub installed: semver::Version,
    /// Version in the store
    pub available: semver::Version,
    /// What applying would mean
    pub status: UpdateStatus,
}

impl UpdatePlan {
    /// Whether applying the plan writes anything
    #[must_use]
    pub fn should_apply(&self) -> bool {
        self.status != UpdateStatus::UpToDate
    }
}

/// Compare the marker's version with the store template
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when either version is not a
/// `MAJOR.MINOR.PATCH` triple.
pub fn plan_update(marker: &ProjectMarker, template: &Template, force: bool) -> Result<UpdatePlan> {
    let installed = parse_version(&marker.version).ok_or_else(|| Error::InvalidVersion {
        name: marker.template.clone(),
        version: marker.version.clone(),
    })?;
    let available = template.semver().ok_or_else(|| Error::InvalidVersion {
        name: template.display_name(),
        version: template.version().unwrap_or_default().to_string(),
    })?;

    let status = if available > installed {
        UpdateStatus::Available
    } else if force {
        UpdateStatus::Forced
    } else {
        UpdateStatus::UpToDate
    };

    Ok(UpdatePlan {
        template: template.display_name(),
        installed,
        available,
        status,
    })
}

/// Effect an update would have on one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// File does not exist yet
    Added,
    /// File exists with different content
    Modified {
        /// Lines the update adds
        insertions: usize,
        /// Lines the update removes
        deletions: usize,
    },
    /// File already has the template's content
    Unchanged,
}

/// Per-file preview row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    /// Path relative to the project
    pub path: PathBuf,
    /// Expected change
    pub change: FileChange,
}

/// Describe what applying `template` to `project` would change, without writing
///
/// # Errors
///
/// Returns [`Error::UnsafePath`] for an unsafe template path, or an I/O error
/// if an existing file cannot be read.
pub fn preview(template: &Template, project: &Path) -> Result<Vec<FilePreview>> {
    plan_files(template)?
        .into_iter()
        .map(|file| {
            let path = project.join(&file.relative);
            let change = match fs::read_to_string(&path) {
                Ok(current) if current == file.content => FileChange::Unchanged,
                Ok(current) => {
                    let diff = TextDiff::from_lines(current.as_str(), file.content);
                    let (mut insertions, mut deletions) = (0, 0);
                    for change in diff.iter_all_changes() {
                        match change.tag() {
                            ChangeTag::Insert => insertions += 1,
                            ChangeTag::Delete => deletions += 1,
                            ChangeTag::Equal => {}
                        }
                    }
                    FileChange::Modified {
                        insertions,
                        deletions,
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileChange::Added,
                Err(err) => return Err(Error::io("read", &path, err)),
            };
            Ok(FilePreview {
                path: file.relative,
                change,
            })
        })
        .collect()
}

/// What an applied update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Files written, relative to the project
    pub files: Vec<PathBuf>,
    /// Backup copies created, relative to the project
    pub backups: Vec<PathBuf>,
    /// Rewritten marker
    pub marker: ProjectMarker,
}

/// First free `<file>.backup-<stamp>`, then `<file>.backup-<stamp>-1`, ...
fn backup_path(project: &Path, relative: &Path, stamp: &str) -> PathBuf {
    let mut counter = 0_u32;
    loop {
        let mut name = relative.as_os_str().to_os_string();
        name.push(format!(".backup-{stamp}"));
        if counter > 0 {
            name.push(format!("-{counter}"));
        }
        let candidate = PathBuf::from(name);
        if !project.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Back up, overwrite and re-mark a project
///
/// Every existing target file is copied to `<file>.backup-<YYYYmmddHHMMSS>`
/// before it is overwritten; an existing backup with that name is never
/// replaced, a numeric suffix is appended instead. The marker keeps `installedAt` and gains the new
/// version and `updatedAt`.
///
/// # Errors
///
/// Returns [`Error::MissingMarker`] for a project without a marker,
/// [`Error::UnsafePath`] before any write, or a partial-failure error listing
/// the files already written.
pub fn apply_update(template: &Template, project: &Path) -> Result<UpdateReport> {
    apply_update_at(template, project, Utc::now())
}

pub(crate) fn apply_update_at(
    template: &Template,
    project: &Path,
    now: DateTime<Utc>,
) -> Result<UpdateReport> {
    let mut marker = ProjectMarker::load(project)?;
    let planned = plan_files(template)?;
    let stamp = now.with_timezone(&Local).format("%Y%m%d%H%M%S").to_string();

    let mut touched: Vec<PathBuf> = Vec::new();
    let mut files = Vec::with_capacity(planned.len());
    let mut backups = Vec::new();

    for file in &planned {
        let target = project.join(&file.relative);
        if target.is_file() {
            let backup = backup_path(project, &file.relative, &stamp);
            fs::copy(&target, project.join(&backup))
                .map_err(|err| partial(&touched, Error::io("back up", &target, err)))?;
            touched.push(backup.clone());
            backups.push(backup);
        }
        write_file(project, file).map_err(|err| partial(&touched, err))?;
        touched.push(file.relative.clone());
        files.push(file.relative.clone());
    }

    marker.version = template.version().unwrap_or_default().to_string();
    marker.updated_at = Some(now);
    marker.save(project).map_err(|err| partial(&touched, err))?;

    info!(
        template = %marker.template,
        version = %marker.version,
        project = %project.display(),
        files = files.len(),
        backups = backups.len(),
        "updated project"
    );

    Ok(UpdateReport {
        files,
        backups,
        marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::Materializer;
    use serde_json::json;
    use tempfile::TempDir;

    fn template(version: &str, readme: &str) -> Template {
        serde_json::from_value(json!({
            "name": "demo",
            "version": version,
            "files": [
                { "path": ".cursorrules", "content": "rules\n" },
                { "path": "README.md", "content": readme },
                { "path": "docs/new.md", "content": "new\n" }
            ]
        }))
        .unwrap()
    }

    fn marker(version: &str) -> ProjectMarker {
        ProjectMarker {
            template: "demo".into(),
            version: version.into(),
            installed_at: Utc::now(),
            project_name: "demo".into(),
            updated_at: None,
            extra: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn test_plan_compares_semver_numerically() {
        let plan = plan_update(&marker("1.9.0"), &template("1.10.0", ""), false).unwrap();
        assert_eq!(plan.status, UpdateStatus::Available);

        let plan = plan_update(&marker("1.1.0"), &template("1.1.0", ""), false).unwrap();
        assert_eq!(plan.status, UpdateStatus::UpToDate);
        assert!(!plan.should_apply());

        let plan = plan_update(&marker("2.0.0"), &template("1.1.0", ""), false).unwrap();
        assert_eq!(plan.status, UpdateStatus::UpToDate);

        let plan = plan_update(&marker("1.1.0"), &template("1.1.0", ""), true).unwrap();
        assert_eq!(plan.status, UpdateStatus::Forced);
        assert!(plan.should_apply());
    }

    #[test]
    fn test_plan_rejects_bad_versions() {
        let err = plan_update(&marker("1.0"), &template("1.1.0", ""), false).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
        let err = plan_update(&marker("1.0.0"), &template("next", ""), false).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { version, .. } if version == "next"));
    }

    #[test]
    fn test_preview_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let project = temp.path();
        Materializer
            .materialize(&template("1.0.0", "one\ntwo\n"), project, "demo")
            .unwrap();
        fs::remove_file(project.join("docs/new.md")).unwrap();

        let rows = preview(&template("1.1.0", "one\nthree\nfour\n"), project).unwrap();
        assert_eq!(rows[0].change, FileChange::Unchanged);
        assert_eq!(
            rows[1].change,
            FileChange::Modified {
                insertions: 2,
                deletions: 1
            }
        );
        assert_eq!(rows[2].change, FileChange::Added);
        assert!(!project.join("docs/new.md").exists());
        assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_apply_backs_up_and_rewrites_marker() {
        let temp = TempDir::new().unwrap();
        let project = temp.path();
        Materializer
            .materialize(&template("1.0.0", "old\n"), project, "demo")
            .unwrap();
        let installed_at = ProjectMarker::load(project).unwrap().installed_at;

        let now = Utc::now();
        let report = apply_update_at(&template("1.1.0", "new\n"), project, now).unwrap();
        let stamp = now.with_timezone(&Local).format("%Y%m%d%H%M%S").to_string();

        assert_eq!(report.backups.len(), 3);
        let readme_backup = project.join(format!("README.md.backup-{stamp}"));
        assert_eq!(fs::read_to_string(readme_backup).unwrap(), "old\n");
        assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "new\n");

        let marker = ProjectMarker::load(project).unwrap();
        assert_eq!(marker.version, "1.1.0");
        assert_eq!(marker.installed_at, installed_at);
        assert_eq!(marker.updated_at, Some(now));
    }

    #[test]
    fn test_repeated_update_keeps_every_backup() {
        let temp = TempDir::new().unwrap();
        let project = temp.path();
        Materializer
            .materialize(&template("1.0.0", "old\n"), project, "demo")
            .unwrap();
        fs::write(project.join("README.md"), "USER EDITS\n").unwrap();

        let now = Utc::now();
        let stamp = now.with_timezone(&Local).format("%Y%m%d%H%M%S").to_string();
        let first = apply_update_at(&template("1.1.0", "new\n"), project, now).unwrap();
        let second = apply_update_at(&template("1.1.0", "new\n"), project, now).unwrap();

        let first_readme = PathBuf::from(format!("README.md.backup-{stamp}"));
        let second_readme = PathBuf::from(format!("README.md.backup-{stamp}-1"));
        assert!(first.backups.contains(&first_readme));
        assert!(second.backups.contains(&second_readme));
        assert_eq!(
            fs::read_to_string(project.join(&first_readme)).unwrap(),
            "USER EDITS\n"
        );
        assert_eq!(
            fs::read_to_string(project.join(&second_readme)).unwrap(),
            "new\n"
        );
    }

    #[test]
    fn test_failed_write_stops_update() {
        let temp = TempDir::new().unwrap();
        let project = temp.path();
        Materializer
            .materialize(&template("1.0.0", "old\n"), project, "demo")
            .unwrap();
        // a regular file where a directory is needed
        fs::write(project.join("blocked"), "").unwrap();

        let next: Template = serde_json::from_value(json!({
            "name": "demo",
            "version": "1.1.0",
            "files": [
                { "path": "README.md", "content": "new\n" },
                { "path": "blocked/inner.md", "content": "x" },
                { "path": "later.md", "content": "later" }
            ]
        }))
        .unwrap();

        let now = Utc::now();
        let stamp = now.with_timezone(&Local).format("%Y%m%d%H%M%S").to_string();
        let err = apply_update_at(&next, project, now).unwrap_err();
        let Error::Materialize { written, .. } = err else {
            panic!("expected partial failure, got {err}");
        };
        assert_eq!(
            written,
            vec![format!("README.md.backup-{stamp}"), "README.md".to_string()]
        );
        assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "new\n");
        assert!(!project.join("later.md").exists());

        let marker = ProjectMarker::load(project).unwrap();
        assert_eq!(marker.version, "1.0.0");
        assert!(marker.updated_at.is_none());
    }

    #[test]
    fn test_update_rejects_entry_without_content() {
        let temp = TempDir::new().unwrap();
        let project = temp.path();
        Materializer
            .materialize(&template("1.0.0", "old\n"), project, "demo")
            .unwrap();

        let broken: Template = serde_json::from_value(json!({
            "name": "demo",
            "version": "1.1.0",
            "files": [{ "path": "README.md" }]
        }))
        .unwrap();
        let err = apply_update(&broken, project).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{err}");
        assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "old\n");
        assert_eq!(ProjectMarker::load(project).unwrap().version, "1.0.0");
    }

    #[test]
    fn test_apply_without_marker() {
        let temp = TempDir::new().unwrap();
        let err = apply_update(&template("1.1.0", ""), temp.path()).unwrap_err();
        assert!(matches!(err, Error::MissingMarker(_)));
        assert!(!temp.path().join("README.md").exists());
    }
}
