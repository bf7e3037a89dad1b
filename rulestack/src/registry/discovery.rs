//! Featured and trending resolution

use std::cmp::Ordering;

use super::Registry;
use crate::rating::{RatingBook, RatingRecord};
use crate::template::Template;

/// Number of templates shown when no curated list applies
pub const FEATURED_FALLBACK_LIMIT: usize = 5;

/// Featured templates
///
/// Curated names from the registry, then from the ratings document, without
/// duplicates and skipping names the store does not know. With no curated
/// names left, the best-rated templates are returned instead.
#[must_use]
pub fn featured<'a>(
    registry: &Registry,
    ratings: &RatingBook,
    templates: &'a [Template],
) -> Vec<&'a Template> {
    let curated = curated(&registry.featured, &ratings.featured, templates);
    if !curated.is_empty() {
        return curated;
    }

    let mut rated: Vec<&Template> = templates
        .iter()
        .filter(|t| ratings.votes_of(&t.display_name()) > 0)
        .collect();
    rated.sort_by(|a, b| {
        let (a, b) = (a.display_name(), b.display_name());
        ratings
            .rating_of(&b)
            .partial_cmp(&ratings.rating_of(&a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| ratings.votes_of(&b).cmp(&ratings.votes_of(&a)))
    });
    rated.truncate(FEATURED_FALLBACK_LIMIT);
    rated
}

/// Trending templates
///
/// Same curation rules as [`featured`]; the fallback is the most-voted
/// templates, most recently reviewed first on equal votes.
#[must_use]
pub fn trending<'a>(
    registry: &Registry,
    ratings: &RatingBook,
    templates: &'a [Template],
) -> Vec<&'a Template> {
    let curated = curated(&registry.trending, &ratings.trending, templates);
    if !curated.is_empty() {
        return curated;
    }

    let mut voted: Vec<&Template> = templates
        .iter()
        .filter(|t| ratings.votes_of(&t.display_name()) > 0)
        .collect();
    voted.sort_by(|a, b| {
        let a = ratings.get(&a.display_name());
        let b = ratings.get(&b.display_name());
        let votes = |r: Option<&RatingRecord>| r.map_or(0, |r| r.votes);
        let latest = |r: Option<&RatingRecord>| r.and_then(RatingRecord::latest_review);
        votes(b)
            .cmp(&votes(a))
            .then_with(|| latest(b).cmp(&latest(a)))
    });
    voted.truncate(FEATURED_FALLBACK_LIMIT);
    voted
}

fn curated<'a>(first: &[String], second: &[String], templates: &'a [Template]) -> Vec<&'a Template> {
    let mut picked: Vec<&Template> = Vec::new();
    for name in first.iter().chain(second) {
        let Some(template) = templates.iter().find(|t| t.answers_to(name)) else {
            continue;
        };
        if !picked.iter().any(|p| std::ptr::eq(*p, template)) {
            picked.push(template);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn catalog() -> Vec<Template> {
        ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|name| serde_json::from_value(json!({ "name": name })).unwrap())
            .collect()
    }

    fn names(list: &[&Template]) -> Vec<String> {
        list.iter().map(|t| t.display_name()).collect()
    }

    #[test]
    fn test_curated_lists_merge_without_duplicates() {
        let templates = catalog();
        let registry = Registry {
            featured: vec!["gamma".into(), "ghost".into(), "alpha".into()],
            ..Registry::default()
        };
        let ratings = RatingBook {
            featured: vec!["alpha".into(), "beta".into()],
            ..RatingBook::default()
        };
        assert_eq!(
            names(&featured(&registry, &ratings, &templates)),
            vec!["gamma", "alpha", "beta"]
        );
    }

    #[test]
    fn test_featured_falls_back_to_best_rated() {
        let templates = catalog();
        let mut ratings = RatingBook::default();
        for (name, stars) in [("alpha", 3), ("beta", 5), ("gamma", 5), ("gamma", 5), ("delta", 4)] {
            ratings.add_rating(&templates, name, stars, None).unwrap();
        }
        assert_eq!(
            names(&featured(&Registry::default(), &ratings, &templates)),
            vec!["gamma", "beta", "delta", "alpha"]
        );
    }

    #[test]
    fn test_trending_falls_back_to_most_voted() {
        let templates = catalog();
        let mut ratings = RatingBook::default();
        let now = Utc::now();
        ratings
            .add_rating_at(&templates, "alpha", 3, Some("old"), now)
            .unwrap();
        ratings
            .add_rating_at(&templates, "beta", 4, Some("new"), now + Duration::hours(1))
            .unwrap();
        for _ in 0..3 {
            ratings.add_rating(&templates, "delta", 2, None).unwrap();
        }
        assert_eq!(
            names(&trending(&Registry::default(), &ratings, &templates)),
            vec!["delta", "beta", "alpha"]
        );
    }

    #[test]
    fn test_nothing_rated_nothing_curated() {
        let templates = catalog();
        assert!(featured(&Registry::default(), &RatingBook::default(), &templates).is_empty());
    }
}
