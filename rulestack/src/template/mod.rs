//! Template descriptor model
//!
//! A template is read from a `template.json` descriptor. Every field is
//! optional in memory so that the validator can report what is missing instead
//! of the parser rejecting the whole descriptor. Unknown keys are kept in
//! `extra` maps and written back unchanged when a descriptor is saved.
//!
//! ```json
//! {
//!   "name": "react-typescript-vite",
//!   "description": "React 18 + TypeScript + Vite starter",
//!   "version": "1.2.0",
//!   "tags": ["react", "typescript", "vite"],
//!   "rules": { "context": "You are an expert React developer", "style": { "language": "typescript" } },
//!   "files": [{ "path": ".cursorrules", "content": "..." }],
//!   "commands": { "install": "npm install", "dev": "npm run dev" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptor file name inside each template directory
pub const DESCRIPTOR_FILE: &str = "template.json";

/// Path of the AI-assistant configuration file inside a template
pub const CURSORRULES_PATH: &str = ".cursorrules";

static SEMVER_TRIPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("valid semver regex"));

static KEBAB_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid kebab regex"));

/// Returns true when `version` is exactly `MAJOR.MINOR.PATCH`
#[must_use]
pub fn is_semver_triple(version: &str) -> bool {
    SEMVER_TRIPLE.is_match(version)
}

/// Returns true when `name` only uses lowercase letters, digits and hyphens
#[must_use]
pub fn is_kebab_name(name: &str) -> bool {
    KEBAB_NAME.is_match(name)
}

/// Normalize free text into a kebab-case template name
///
/// Separators such as `.`, `_` and spaces become hyphens; any character that
/// is not a lowercase letter, digit or hyphen is dropped.
#[must_use]
pub fn to_kebab_name(raw: &str) -> String {
    let converted = raw.replace(['.', '_', '/'], " ").to_case(Case::Kebab);
    let mut name = String::with_capacity(converted.len());
    for ch in converted.chars() {
        match ch {
            'a'..='z' | '0'..='9' => name.push(ch),
            '-' if !name.is_empty() && !name.ends_with('-') => name.push('-'),
            _ => {}
        }
    }
    name.trim_end_matches('-').to_string()
}

/// Parse a `MAJOR.MINOR.PATCH` string into a comparable version
#[must_use]
pub fn parse_version(version: &str) -> Option<semver::Version> {
    if is_semver_triple(version) {
        semver::Version::parse(version).ok()
    } else {
        None
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// A project template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique template name, also the store subdirectory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `MAJOR.MINOR.PATCH` version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Search and classification tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Template author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// AI-assistant configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Rules>,

    /// Files written when the template is materialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<TemplateFile>>,

    /// Developer commands (install, dev, build, test, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<BTreeMap<String, String>>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,

    /// Directory the descriptor was loaded from
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl Template {
    /// Name, or an empty string when the descriptor has none
    #[must_use]
    pub fn name(&self) -> &str {
        non_empty(self.name.as_ref()).unwrap_or_default()
    }

    /// Name for display: descriptor name, then directory name, then a placeholder
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = non_empty(self.name.as_ref()) {
            return name.to_string();
        }
        self.dir_name()
            .map_or_else(|| "<unnamed>".to_string(), ToString::to_string)
    }

    /// Name of the directory the descriptor was loaded from
    #[must_use]
    pub fn dir_name(&self) -> Option<&str> {
        self.source_dir
            .as_deref()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
    }

    /// Non-empty name
    #[must_use]
    pub fn name_opt(&self) -> Option<&str> {
        non_empty(self.name.as_ref())
    }

    /// Non-empty description
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_ref())
    }

    /// Non-empty version string (not necessarily well-formed)
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        non_empty(self.version.as_ref())
    }

    /// Parsed version, when it is a well-formed triple
    #[must_use]
    pub fn semver(&self) -> Option<semver::Version> {
        self.version().and_then(parse_version)
    }

    /// Non-empty author
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        non_empty(self.author.as_ref())
    }

    /// Tags, empty when absent
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Files, `None` when the descriptor has no `files` key
    #[must_use]
    pub fn files(&self) -> Option<&[TemplateFile]> {
        self.files.as_deref()
    }

    /// The `.cursorrules` entry, if declared
    #[must_use]
    pub fn cursorrules(&self) -> Option<&TemplateFile> {
        self.files()?
            .iter()
            .find(|file| file.path.as_deref() == Some(CURSORRULES_PATH))
    }

    /// Command by name (`install`, `dev`, ...)
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands
            .as_ref()
            .and_then(|commands| commands.get(name))
            .map(String::as_str)
    }

    /// Lowercased name and tags, the surface used for keyword matching
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        std::iter::once(self.name().to_lowercase())
            .chain(self.tags().iter().map(|tag| tag.to_lowercase()))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Identity check used by store lookups
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name_opt() == Some(name) || self.dir_name() == Some(name)
    }
}

/// AI-assistant configuration block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Role and project context for the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Coding style settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,

    /// Things the assistant must not do
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<String>>,

    /// Things the assistant should prefer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Rules {
    /// Non-empty context
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        non_empty(self.context.as_ref())
    }

    /// Restrictions, `None` when absent or empty
    #[must_use]
    pub fn restrictions(&self) -> Option<&[String]> {
        self.restrictions.as_deref().filter(|list| !list.is_empty())
    }

    /// Preferences, `None` when absent or empty
    #[must_use]
    pub fn preferences(&self) -> Option<&[String]> {
        self.preferences.as_deref().filter(|list| !list.is_empty())
    }
}

/// `rules.style`: either free text or a bag of settings
///
/// Recognized keys are `language`, `framework` and `conventions`; anything else
/// is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Style {
    /// Free-form description, e.g. `"functional components, hooks"`
    Text(String),
    /// Structured settings
    Fields(StyleFields),
}

/// Structured `rules.style`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleFields {
    /// Primary language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Primary framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    /// Conventions, either a single string or a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conventions: Option<Value>,

    /// Unrecognized settings
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Style {
    /// Declared language
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Fields(fields) => non_empty(fields.language.as_ref()),
            Self::Text(_) => None,
        }
    }

    /// Declared framework
    #[must_use]
    pub fn framework(&self) -> Option<&str> {
        match self {
            Self::Fields(fields) => non_empty(fields.framework.as_ref()),
            Self::Text(_) => None,
        }
    }

    /// Conventions flattened to strings
    #[must_use]
    pub fn conventions(&self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text.clone()],
            Self::Fields(fields) => match &fields.conventions {
                Some(Value::String(text)) => vec![text.clone()],
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(ToString::to_string))
                    .collect(),
                _ => Vec::new(),
            },
        }
    }
}

/// A file declared by a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Path relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Literal file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TemplateFile {
    /// Create a file entry
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            content: Some(content.into()),
        }
    }

    /// Non-empty path
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        non_empty(self.path.as_ref())
    }

    /// Non-empty content
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        non_empty(self.content.as_ref())
    }

    /// Content length in characters, 0 when absent
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_semver_triple() {
        assert!(is_semver_triple("1.0.0"));
        assert!(is_semver_triple("10.20.30"));
        assert!(!is_semver_triple("1.0"));
        assert!(!is_semver_triple("1.0.0-beta"));
        assert!(!is_semver_triple("v1.0.0"));
        assert!(!is_semver_triple(""));
    }

    #[test]
    fn test_parse_version_is_numeric() {
        let a = parse_version("1.10.0").unwrap();
        let b = parse_version("1.9.0").unwrap();
        assert!(a > b);
        assert!(parse_version("1.0").is_none());
    }

    #[test]
    fn test_kebab_names() {
        assert!(is_kebab_name("react-typescript-vite"));
        assert!(is_kebab_name("vue3"));
        assert!(!is_kebab_name("React_App"));
        assert!(!is_kebab_name(""));
    }

    #[test]
    fn test_to_kebab_name() {
        assert_eq!(to_kebab_name("MyCoolRepo"), "my-cool-repo");
        assert_eq!(to_kebab_name("awesome_template"), "awesome-template");
        assert_eq!(to_kebab_name("Fancy Starter Kit"), "fancy-starter-kit");
        assert_eq!(to_kebab_name("--weird--"), "weird");
        assert!(is_kebab_name(&to_kebab_name("Next.js App!")));
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let template: Template = serde_json::from_value(json!({ "name": "bare" })).unwrap();
        assert_eq!(template.name(), "bare");
        assert!(template.description().is_none());
        assert!(template.files().is_none());
        assert!(template.tags().is_empty());
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let template: Template =
            serde_json::from_value(json!({ "name": "", "version": "" })).unwrap();
        assert!(template.name_opt().is_none());
        assert!(template.version().is_none());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let value = json!({
            "name": "demo",
            "category": "frontend",
            "rules": { "context": "ctx", "examples": ["a"] }
        });
        let template: Template = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(template.extra.get("category"), Some(&json!("frontend")));
        assert_eq!(serde_json::to_value(&template).unwrap(), value);
    }

    #[test]
    fn test_style_variants() {
        let text: Style = serde_json::from_value(json!("functional components")).unwrap();
        assert_eq!(text.conventions(), vec!["functional components".to_string()]);
        assert!(text.framework().is_none());

        let fields: Style = serde_json::from_value(json!({
            "language": "typescript",
            "framework": "react",
            "conventions": ["hooks", "named exports"],
            "indent": 2
        }))
        .unwrap();
        assert_eq!(fields.language(), Some("typescript"));
        assert_eq!(fields.framework(), Some("react"));
        assert_eq!(fields.conventions().len(), 2);
        let Style::Fields(inner) = fields else {
            panic!("expected structured style");
        };
        assert_eq!(inner.extra.get("indent"), Some(&json!(2)));
    }

    #[test]
    fn test_cursorrules_lookup() {
        let template: Template = serde_json::from_value(json!({
            "files": [
                { "path": "README.md", "content": "hi" },
                { "path": ".cursorrules", "content": "You are helpful" }
            ]
        }))
        .unwrap();
        let rules = template.cursorrules().unwrap();
        assert_eq!(rules.content(), Some("You are helpful"));
        assert_eq!(rules.content_len(), 15);
    }

    #[test]
    fn test_answers_to_dir_name() {
        let template = Template {
            source_dir: Some(PathBuf::from("/store/fallback-dir")),
            ..Template::default()
        };
        assert!(template.answers_to("fallback-dir"));
        assert_eq!(template.display_name(), "fallback-dir");
    }
}
