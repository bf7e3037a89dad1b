//! Terminal formatting shared by commands

use console::{style, Emoji, StyledObject};
use rulestack::prelude::*;

pub(crate) static SUCCESS: Emoji<'_, '_> = Emoji("✓ ", "√ ");
pub(crate) static FAILURE: Emoji<'_, '_> = Emoji("✗ ", "x ");
pub(crate) static WARNING: Emoji<'_, '_> = Emoji("⚠ ", "! ");
pub(crate) static STAR: Emoji<'_, '_> = Emoji("★", "*");
pub(crate) static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
pub(crate) static FIRE: Emoji<'_, '_> = Emoji("🔥 ", "");
pub(crate) static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");

/// `★ 4.3 (12)` for a rated template
pub(crate) fn rating_badge(ratings: &RatingBook, name: &str) -> Option<String> {
    ratings
        .get(name)
        .filter(|record| record.votes > 0)
        .map(|record| format!("{STAR} {:.1} ({})", record.rating, record.votes))
}

/// Grade colored by band
pub(crate) fn styled_grade(grade: Grade) -> StyledObject<&'static str> {
    let label = style(grade.as_str()).bold();
    match grade {
        Grade::APlus | Grade::A | Grade::AMinus => label.green(),
        Grade::BPlus | Grade::B | Grade::BMinus => label.cyan(),
        Grade::CPlus | Grade::C | Grade::CMinus => label.yellow(),
        Grade::D | Grade::F => label.red(),
    }
}

/// Two-line summary used by list, search and discovery commands
pub(crate) fn print_template(template: &Template, ratings: &RatingBook) {
    let name = template.display_name();
    let mut header = format!("{}", style(&name).cyan().bold());
    if let Some(version) = template.version() {
        header.push_str(&format!(" {}", style(format!("v{version}")).dim()));
    }
    if let Some(badge) = rating_badge(ratings, &name) {
        header.push_str(&format!("  {}", style(badge).yellow()));
    }
    println!("  {header}");

    if let Some(description) = template.description() {
        println!("    {description}");
    }
    if !template.tags().is_empty() {
        println!("    {}", style(template.tags().join(", ")).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_badge() {
        let templates: Vec<Template> =
            vec![serde_json::from_value(json!({ "name": "demo" })).unwrap()];
        let mut ratings = RatingBook::default();
        assert!(rating_badge(&ratings, "demo").is_none());

        ratings.add_rating(&templates, "demo", 4, None).unwrap();
        ratings.add_rating(&templates, "demo", 5, None).unwrap();
        let badge = rating_badge(&ratings, "demo").unwrap();
        assert!(badge.ends_with("4.5 (2)"), "{badge}");
    }
}
