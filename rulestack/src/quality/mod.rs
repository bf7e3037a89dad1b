//! Template quality scoring
//!
//! A score out of 100 built from four additive dimensions:
//!
//! | Dimension      | Max |
//! |----------------|-----|
//! | Completeness   | 30  |
//! | Documentation  | 25  |
//! | Best practices | 25  |
//! | Usability      | 20  |
//!
//! Scoring never fails: missing fields earn partial or no credit plus an
//! issue or recommendation explaining what to add.

mod report;

pub use report::{Frequency, QualityReport, TemplateSummary, QUALITY_REPORT_FILE};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::{is_kebab_name, is_semver_triple, Template};

/// Framework keywords that earn full usability credit
pub const KNOWN_FRAMEWORKS: &[&str] = &[
    "react", "vue", "angular", "svelte", "nextjs", "nuxt", "flutter", "django", "express",
];

/// Letter grade derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above
    #[serde(rename = "A+")]
    APlus,
    /// 85–89
    #[serde(rename = "A")]
    A,
    /// 80–84
    #[serde(rename = "A-")]
    AMinus,
    /// 75–79
    #[serde(rename = "B+")]
    BPlus,
    /// 70–74
    #[serde(rename = "B")]
    B,
    /// 65–69
    #[serde(rename = "B-")]
    BMinus,
    /// 60–64
    #[serde(rename = "C+")]
    CPlus,
    /// 55–59
    #[serde(rename = "C")]
    C,
    /// 50–54
    #[serde(rename = "C-")]
    CMinus,
    /// 40–49
    #[serde(rename = "D")]
    D,
    /// Below 40
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// All grades, best first
    pub const ALL: [Self; 11] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::D,
        Self::F,
    ];

    /// Map a score to its grade band
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::APlus,
            85..=89 => Self::A,
            80..=84 => Self::AMinus,
            75..=79 => Self::BPlus,
            70..=74 => Self::B,
            65..=69 => Self::BMinus,
            60..=64 => Self::CPlus,
            55..=59 => Self::C,
            50..=54 => Self::CMinus,
            40..=49 => Self::D,
            _ => Self::F,
        }
    }

    /// Display label, e.g. `A-`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points earned in one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Points earned
    pub score: u32,
    /// Maximum attainable
    pub max: u32,
}

/// Per-dimension detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Required fields, `.cursorrules`, commands
    pub completeness: DimensionScore,
    /// Description and `.cursorrules` depth
    pub documentation: DimensionScore,
    /// Version, tags, rules structure
    pub best_practices: DimensionScore,
    /// Naming, authorship, framework discoverability
    pub usability: DimensionScore,
}

/// Result of scoring one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    /// Template display name
    pub name: String,
    /// Total, 0..=100
    pub score: u32,
    /// Letter grade for `score`
    pub grade: Grade,
    /// Problems that cost points
    pub issues: Vec<String>,
    /// Suggestions for improvement
    pub recommendations: Vec<String>,
    /// Per-dimension points
    pub breakdown: Breakdown,
}

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl Findings {
    fn issue(&mut self, text: &str) {
        self.issues.push(text.to_string());
    }

    fn recommend(&mut self, text: &str) {
        self.recommendations.push(text.to_string());
    }
}

/// Computes [`QualityScore`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    /// Score a template
    #[must_use]
    pub fn score(&self, template: &Template) -> QualityScore {
        let mut findings = Findings::default();

        let breakdown = Breakdown {
            completeness: DimensionScore {
                score: completeness(template, &mut findings),
                max: 30,
            },
            documentation: DimensionScore {
                score: documentation(template, &mut findings),
                max: 25,
            },
            best_practices: DimensionScore {
                score: best_practices(template, &mut findings),
                max: 25,
            },
            usability: DimensionScore {
                score: usability(template, &mut findings),
                max: 20,
            },
        };

        let score = (breakdown.completeness.score
            + breakdown.documentation.score
            + breakdown.best_practices.score
            + breakdown.usability.score)
            .min(100);

        QualityScore {
            name: template.display_name(),
            score,
            grade: Grade::from_score(score),
            issues: findings.issues,
            recommendations: findings.recommendations,
            breakdown,
        }
    }

    /// Score every template, keeping input order
    #[must_use]
    pub fn score_all(&self, templates: &[Template]) -> Vec<QualityScore> {
        templates.iter().map(|t| self.score(t)).collect()
    }
}

fn completeness(template: &Template, findings: &mut Findings) -> u32 {
    let missing = [
        template.name_opt().is_none(),
        template.description().is_none(),
        template.version().is_none(),
        template.rules.is_none(),
        template.files().is_none(),
    ]
    .into_iter()
    .filter(|missing| *missing)
    .count();
    let mut points = 15_u32.saturating_sub(3 * u32::try_from(missing).unwrap_or(5));

    if template.files().is_none() {
        findings.issue("No files defined");
    } else if template.cursorrules().is_some() {
        points += 10;
    } else {
        points += 5;
        findings.issue("Missing .cursorrules file");
    }

    let has_install = template.command("install").is_some();
    let has_dev = template.command("dev").is_some();
    points += match (has_install, has_dev) {
        (true, true) => 5,
        (true, false) | (false, true) => 3,
        (false, false) => 0,
    };
    if !has_install {
        findings.recommend("Add an install command");
    }
    if !has_dev {
        findings.recommend("Add a dev command");
    }

    points
}

fn documentation(template: &Template, findings: &mut Findings) -> u32 {
    let mut points = 0;

    match template.description().map(|d| d.chars().count()) {
        None => findings.issue("Missing description"),
        Some(length) if length > 50 => points += 10,
        Some(length) if length > 20 => points += 7,
        Some(_) => {
            points += 4;
            findings.recommend("Expand the description to at least 50 characters");
        }
    }

    if let Some(rules_file) = template.cursorrules() {
        let length = rules_file.content_len();
        if length > 500 {
            points += 15;
        } else if length > 200 {
            points += 10;
            findings.recommend("Expand .cursorrules with more detailed guidance (500+ characters)");
        } else {
            points += 5;
            findings.issue(".cursorrules content is too brief");
        }

        let content = rules_file.content.as_deref().unwrap_or_default();
        if !(content.contains("context") || content.contains("You are")) {
            findings.recommend("Add project context to .cursorrules (e.g. \"You are an expert...\")");
        }
        if !(content.contains("```") || content.contains("Example")) {
            findings.recommend("Add code examples to .cursorrules");
        }
        if !(content.contains("Best Practices") || content.contains("## ")) {
            findings.recommend("Add a Best Practices section to .cursorrules");
        }
    }

    points
}

fn best_practices(template: &Template, findings: &mut Findings) -> u32 {
    let mut points = 0;

    if template.version().is_some_and(is_semver_triple) {
        points += 5;
    } else {
        findings.issue("Version is missing or not in MAJOR.MINOR.PATCH format");
    }

    let tag_count = template.tags().len();
    if tag_count == 0 {
        findings.issue("No tags defined");
    } else {
        points += 5;
        if tag_count < 3 {
            findings.recommend("Add at least 3 tags for better discoverability");
        }
    }

    let Some(rules) = &template.rules else {
        findings.issue("Missing rules configuration");
        return points;
    };

    if rules.context().is_some() {
        points += 4;
    } else {
        findings.issue("Missing rules.context");
    }
    if rules.style.is_some() {
        points += 4;
    } else {
        findings.issue("Missing rules.style");
    }
    if rules.restrictions().is_some() {
        points += 3;
    } else {
        findings.recommend("Add rules.restrictions to tell the assistant what to avoid");
    }
    if rules.preferences().is_some() {
        points += 4;
    } else {
        findings.recommend("Add rules.preferences to describe preferred patterns");
    }

    points
}

fn usability(template: &Template, findings: &mut Findings) -> u32 {
    if template.tags.is_none() || template.rules.is_none() {
        return 0;
    }

    let mut points = 0;

    if is_kebab_name(template.name()) {
        points += 5;
    } else {
        points += 3;
        findings.recommend("Use kebab-case for the template name");
    }

    if template.author().is_some() {
        points += 5;
    } else {
        findings.recommend("Add an author");
    }

    let keywords = template.keywords();
    let mentions_framework = KNOWN_FRAMEWORKS
        .iter()
        .any(|framework| keywords.iter().any(|word| word.contains(framework)));
    if mentions_framework {
        points += 10;
    } else {
        points += 5;
        findings.recommend("Mention the framework in tags (e.g. react, vue, django)");
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(value: serde_json::Value) -> Template {
        serde_json::from_value(value).unwrap()
    }

    fn rich_cursorrules() -> String {
        let mut content = String::from(
            "You are an expert React developer working in this project context.\n\n## Best Practices\n\n",
        );
        content.push_str("```tsx\nexport function App() { return <div />; }\n```\n");
        while content.len() <= 520 {
            content.push_str("- Prefer small, focused components with explicit props.\n");
        }
        content
    }

    fn perfect() -> serde_json::Value {
        json!({
            "name": "react-typescript-vite",
            "description": "Production-ready React 18 starter with TypeScript, Vite and Vitest",
            "version": "1.0.0",
            "author": "rulestack",
            "tags": ["react", "typescript", "vite"],
            "rules": {
                "context": "You are a React expert",
                "style": { "language": "typescript" },
                "restrictions": ["no any"],
                "preferences": ["hooks"]
            },
            "files": [{ "path": ".cursorrules", "content": rich_cursorrules() }],
            "commands": { "install": "npm install", "dev": "npm run dev" }
        })
    }

    #[test]
    fn test_perfect_template_scores_100() {
        let result = QualityScorer.score(&template(perfect()));
        assert_eq!(result.score, 100, "{result:#?}");
        assert_eq!(result.grade, Grade::APlus);
        assert!(result.issues.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_empty_template_scores_zero() {
        let result = QualityScorer.score(&template(json!({})));
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, Grade::F);
        assert!(result.issues.contains(&"No files defined".to_string()));
        assert!(result.issues.contains(&"Missing rules configuration".to_string()));
        assert_eq!(result.breakdown.usability.score, 0);
    }

    #[test]
    fn test_grade_bands() {
        let cases = [
            (100, "A+"),
            (90, "A+"),
            (89, "A"),
            (85, "A"),
            (84, "A-"),
            (80, "A-"),
            (75, "B+"),
            (70, "B"),
            (65, "B-"),
            (60, "C+"),
            (55, "C"),
            (50, "C-"),
            (49, "D"),
            (40, "D"),
            (39, "F"),
            (0, "F"),
        ];
        for (score, label) in cases {
            assert_eq!(Grade::from_score(score).as_str(), label, "score {score}");
        }
    }

    #[test]
    fn test_missing_context_costs_four_points() {
        let mut value = perfect();
        value["rules"].as_object_mut().unwrap().remove("context");
        let result = QualityScorer.score(&template(value));
        assert_eq!(result.breakdown.best_practices.score, 21);
        assert!(result.issues.contains(&"Missing rules.context".to_string()));
    }

    #[test]
    fn test_completeness_partial_credit() {
        let mut value = perfect();
        value["files"] = json!([{ "path": "README.md", "content": "hi" }]);
        value["commands"] = json!({ "install": "npm install" });
        value.as_object_mut().unwrap().remove("description");
        let result = QualityScorer.score(&template(value));
        // 12 (one required field missing) + 5 (no .cursorrules) + 3 (install only)
        assert_eq!(result.breakdown.completeness.score, 20);
        assert!(result.issues.contains(&"Missing .cursorrules file".to_string()));
        assert_eq!(
            result.recommendations.iter().filter(|r| r.contains("dev command")).count(),
            1
        );
    }

    #[test]
    fn test_documentation_bands() {
        let mut value = perfect();
        value["description"] = json!("Short one");
        value["files"] = json!([{ "path": ".cursorrules", "content": "a".repeat(300) }]);
        let result = QualityScorer.score(&template(value));
        // 4 (short description) + 10 (201..=500 chars)
        assert_eq!(result.breakdown.documentation.score, 14);
        assert_eq!(
            result
                .recommendations
                .iter()
                .filter(|r| r.contains(".cursorrules"))
                .count(),
            4
        );
    }

    #[test]
    fn test_brief_cursorrules_is_issue() {
        let mut value = perfect();
        value["files"] = json!([{ "path": ".cursorrules", "content": "You are ## Example" }]);
        let result = QualityScorer.score(&template(value));
        assert_eq!(result.breakdown.documentation.score, 15);
        assert!(result.issues.contains(&".cursorrules content is too brief".to_string()));
        assert!(!result.recommendations.iter().any(|r| r.contains("code examples")));
    }

    #[test]
    fn test_usability_requires_tags_and_rules() {
        let mut value = perfect();
        value.as_object_mut().unwrap().remove("rules");
        let result = QualityScorer.score(&template(value));
        assert_eq!(result.breakdown.usability.score, 0);
        assert!(!result.recommendations.iter().any(|r| r.contains("author")));
    }

    #[test]
    fn test_usability_partial_credit() {
        let mut value = perfect();
        value["name"] = json!("My_Template");
        value["tags"] = json!(["typescript"]);
        value.as_object_mut().unwrap().remove("author");
        let result = QualityScorer.score(&template(value));
        assert_eq!(result.breakdown.usability.score, 3 + 5);
        assert_eq!(result.recommendations.len(), 4);
    }

    #[test]
    fn test_framework_match_uses_name() {
        let mut value = perfect();
        value["name"] = json!("django-rest-starter");
        value["tags"] = json!(["python", "api", "rest"]);
        let result = QualityScorer.score(&template(value));
        assert_eq!(result.breakdown.usability.score, 20);
    }
}
