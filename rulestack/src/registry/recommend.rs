//! Project-aware recommendations

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::quality::QualityScorer;
use crate::rating::RatingBook;
use crate::template::Template;

/// Default number of recommendations
pub const DEFAULT_RECOMMEND_LIMIT: usize = 5;

/// `package.json` dependency name to stack signal
const NPM_SIGNALS: &[(&str, &str)] = &[
    ("react", "react"),
    ("vue", "vue"),
    ("next", "nextjs"),
    ("nuxt", "nuxt"),
    ("svelte", "svelte"),
    ("@angular/core", "angular"),
    ("express", "express"),
    ("electron", "electron"),
    ("@tauri-apps/api", "tauri"),
    ("react-native", "react-native"),
];

/// A ranked recommendation
#[derive(Debug, Clone)]
pub struct Recommendation<'a> {
    /// Recommended template
    pub template: &'a Template,
    /// Stack signals found in the template's name or tags
    pub matched: Vec<String>,
    /// Quality score
    pub quality: u32,
    /// Mean rating, 0 when unrated
    pub rating: f64,
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::io("read", path, err)),
    }
}

fn push_signal(signals: &mut Vec<String>, signal: &str) {
    if !signals.iter().any(|s| s == signal) {
        signals.push(signal.to_string());
    }
}

/// Detect stack signals from the manifests in `dir`
///
/// # Errors
///
/// Returns an error if a manifest exists but cannot be read. A malformed
/// `package.json` is logged and ignored.
pub fn detect_stack(dir: &Path) -> Result<Vec<String>> {
    let mut signals = Vec::new();

    let package_json = dir.join("package.json");
    if let Some(raw) = read_optional(&package_json)? {
        match serde_json::from_str::<Value>(&raw) {
            Ok(manifest) => {
                let deps: Vec<&str> = ["dependencies", "devDependencies", "peerDependencies"]
                    .iter()
                    .filter_map(|key| manifest.get(key).and_then(Value::as_object))
                    .flat_map(|table| table.keys().map(String::as_str))
                    .collect();
                for (dependency, signal) in NPM_SIGNALS {
                    if deps.contains(dependency) {
                        push_signal(&mut signals, signal);
                    }
                }
            }
            Err(err) => warn!(path = %package_json.display(), error = %err, "ignoring malformed package.json"),
        }
    }

    for manifest in ["requirements.txt", "pyproject.toml"] {
        if let Some(raw) = read_optional(&dir.join(manifest))? {
            let raw = raw.to_lowercase();
            push_signal(&mut signals, "python");
            for framework in ["django", "fastapi"] {
                if raw.contains(framework) {
                    push_signal(&mut signals, framework);
                }
            }
        }
    }

    if dir.join("pubspec.yaml").is_file() {
        push_signal(&mut signals, "flutter");
    }

    if let Some(raw) = read_optional(&dir.join("Cargo.toml"))? {
        push_signal(&mut signals, "rust");
        if raw.contains("tauri") {
            push_signal(&mut signals, "tauri");
        }
    }

    debug!(dir = %dir.display(), signals = ?signals, "detected stack");
    Ok(signals)
}

/// Rank templates against detected stack signals
///
/// Order: matched signal count, quality score, rating (all descending), then
/// store order. Templates matching nothing are only returned when no template
/// matches at all.
#[must_use]
pub fn recommend<'a>(
    templates: &'a [Template],
    signals: &[String],
    ratings: &RatingBook,
    limit: usize,
) -> Vec<Recommendation<'a>> {
    let scorer = QualityScorer;
    let mut ranked: Vec<Recommendation<'a>> = templates
        .iter()
        .map(|template| {
            let keywords = template.keywords();
            let matched = signals
                .iter()
                .filter(|signal| keywords.iter().any(|word| word.contains(signal.as_str())))
                .cloned()
                .collect();
            Recommendation {
                template,
                matched,
                quality: scorer.score(template).score,
                rating: ratings.rating_of(&template.display_name()),
            }
        })
        .collect();

    if ranked.iter().any(|r| !r.matched.is_empty()) {
        ranked.retain(|r| !r.matched.is_empty());
    }

    ranked.sort_by(|a, b| {
        b.matched
            .len()
            .cmp(&a.matched.len())
            .then_with(|| b.quality.cmp(&a.quality))
            .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
    });
    ranked.truncate(limit);
    ranked
}
