//! Quality scoring command

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use rulestack::prelude::*;
use rulestack::quality::{DimensionScore, Frequency};

use crate::context::Workspace;
use crate::output::{styled_grade, WARNING};

/// Score template quality
#[derive(Debug, Args)]
pub struct QualityCommand {
    /// Score a single template in detail
    #[arg(short, long)]
    pub template: Option<String>,

    /// Write quality-report.json to the report directory
    #[arg(long)]
    pub report: bool,
}

impl QualityCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be loaded, the named template
    /// does not exist, or the report cannot be written.
    pub fn execute(&self, workspace: &Workspace) -> Result<()> {
        let scorer = QualityScorer;

        let scores = if let Some(name) = &self.template {
            let template = workspace
                .store
                .find(name)
                .with_context(|| format!("Cannot score '{name}'"))?;
            let score = scorer.score(&template);
            print_detail(&template, &score);
            vec![score]
        } else {
            let templates = workspace.templates()?;
            let scores = scorer.score_all(&templates);
            print_table(&scores);
            scores
        };

        if self.report {
            let report = QualityReport::from_scores(&scores);
            let path = report
                .write_to(&workspace.report_dir())
                .context("Failed to write quality report")?;
            println!();
            println!("Report written to {}", style(path.display()).dim());
        }
        Ok(())
    }
}

fn dimension(label: &str, value: DimensionScore) {
    println!("    {label:<15} {:>2}/{}", value.score, value.max);
}

fn print_detail(template: &Template, score: &QualityScore) {
    println!(
        "{} {}  {} {}",
        style(&score.name).cyan().bold(),
        style(format!("{}/100", score.score)).bold(),
        style("grade").dim(),
        styled_grade(score.grade)
    );
    if let Some(stack) = template.rules.as_ref().and_then(|rules| rules.style.as_ref()) {
        let declared: Vec<&str> = [stack.framework(), stack.language()]
            .into_iter()
            .flatten()
            .collect();
        if !declared.is_empty() {
            println!("  {} {}", style("Stack:").dim(), declared.join(" / "));
        }
        let conventions = stack.conventions();
        if !conventions.is_empty() {
            println!("  {} {}", style("Conventions:").dim(), conventions.join(", "));
        }
    }
    println!();
    dimension("Completeness", score.breakdown.completeness);
    dimension("Documentation", score.breakdown.documentation);
    dimension("Best practices", score.breakdown.best_practices);
    dimension("Usability", score.breakdown.usability);

    if !score.issues.is_empty() {
        println!();
        println!("  {}", style("Issues").red().bold());
        for issue in &score.issues {
            println!("    {WARNING}{issue}");
        }
    }
    if !score.recommendations.is_empty() {
        println!();
        println!("  {}", style("Recommendations").yellow().bold());
        for recommendation in &score.recommendations {
            println!("    - {recommendation}");
        }
    }
}

fn print_table(scores: &[QualityScore]) {
    if scores.is_empty() {
        println!("{}", style("No templates found").yellow());
        return;
    }

    println!("{}", style("Template quality").bold());
    println!();
    for score in scores {
        println!(
            "  {:>3}  {:<3} {}",
            score.score,
            styled_grade(score.grade),
            style(&score.name).cyan()
        );
    }

    let summary = QualityReport::from_scores(scores);
    println!();
    println!(
        "Average score: {} across {} templates",
        style(format!("{:.1}", summary.average_score)).bold(),
        summary.template_count
    );

    let histogram: Vec<String> = summary
        .grade_distribution
        .iter()
        .map(|(grade, count)| format!("{} {count}", styled_grade(*grade)))
        .collect();
    println!("Grades: {}", histogram.join("  "));

    print_frequencies("Most common issues", &summary.top_issues);
    print_frequencies("Most common recommendations", &summary.top_recommendations);
}

fn print_frequencies(heading: &str, entries: &[Frequency]) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!("  {}", style(heading).bold());
    for entry in entries {
        println!("    {:>3}x {}", entry.count, entry.text);
    }
}
