//! Aggregate quality report

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Grade, QualityScore};
use crate::error::Result;
use crate::json::write_json;

/// File name of the quality report inside the report directory
pub const QUALITY_REPORT_FILE: &str = "quality-report.json";

const TOP_N: usize = 5;

/// A message and how many times it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    /// Issue or recommendation text
    pub text: String,
    /// Number of templates reporting it
    pub count: usize,
}

/// One row of the per-template table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Template display name
    pub name: String,
    /// Total score
    pub score: u32,
    /// Letter grade
    pub grade: Grade,
}

/// Quality report over a whole store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Number of templates scored
    pub template_count: usize,
    /// Mean score rounded to one decimal, 0 for an empty store
    pub average_score: f64,
    /// Templates per grade, best grade first
    pub grade_distribution: BTreeMap<Grade, usize>,
    /// Per-template scores in store order
    pub templates: Vec<TemplateSummary>,
    /// Most frequent issues
    pub top_issues: Vec<Frequency>,
    /// Most frequent recommendations
    pub top_recommendations: Vec<Frequency>,
}

impl QualityReport {
    /// Summarize individual scores
    #[must_use]
    pub fn from_scores(scores: &[QualityScore]) -> Self {
        let mut grade_distribution = BTreeMap::new();
        for score in scores {
            *grade_distribution.entry(score.grade).or_insert(0) += 1;
        }

        Self {
            generated_at: Utc::now(),
            template_count: scores.len(),
            average_score: average(scores),
            grade_distribution,
            templates: scores
                .iter()
                .map(|s| TemplateSummary {
                    name: s.name.clone(),
                    score: s.score,
                    grade: s.grade,
                })
                .collect(),
            top_issues: most_frequent(scores.iter().flat_map(|s| &s.issues)),
            top_recommendations: most_frequent(scores.iter().flat_map(|s| &s.recommendations)),
        }
    }

    /// Write the report as `quality-report.json` under `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(QUALITY_REPORT_FILE);
        write_json(&path, self, "quality report")?;
        Ok(path)
    }
}

fn average(scores: &[QualityScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: u32 = scores.iter().map(|s| s.score).sum();
    let count = u32::try_from(scores.len()).unwrap_or(u32::MAX);
    (f64::from(total) / f64::from(count) * 10.0).round() / 10.0
}

/// Count occurrences and keep the `TOP_N` most frequent, first-seen order on ties
fn most_frequent<'a>(messages: impl Iterator<Item = &'a String>) -> Vec<Frequency> {
    let mut seen: Vec<Frequency> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for message in messages {
        if let Some(&at) = index.get(message.as_str()) {
            seen[at].count += 1;
        } else {
            index.insert(message.as_str(), seen.len());
            seen.push(Frequency {
                text: message.clone(),
                count: 1,
            });
        }
    }

    // stable: equal counts keep first-seen order
    seen.sort_by(|a, b| b.count.cmp(&a.count));
    seen.truncate(TOP_N);
    seen
}
