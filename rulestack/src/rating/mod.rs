//! Rating aggregation
//!
//! Ratings live in their own document, keyed by template name:
//!
//! ```json
//! {
//!   "templates": {
//!     "react-typescript-vite": {
//!       "rating": 4.0,
//!       "votes": 3,
//!       "total": 12,
//!       "reviews": [{ "rating": 5, "comment": "Great", "date": "2026-01-02T10:00:00Z" }]
//!     }
//!   },
//!   "featured": [],
//!   "trending": []
//! }
//! ```
//!
//! `total` keeps the exact sum of submitted ratings so the mean never drifts
//! from repeated rounding. Documents written without it are read back with
//! `total = round(rating * votes)`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::json::{read_json, write_json};
use crate::template::Template;

/// Lowest accepted rating
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating
pub const MAX_RATING: i64 = 5;

/// A single written review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Rating submitted with the review
    pub rating: u8,
    /// Review text
    pub comment: String,
    /// Submission time
    pub date: DateTime<Utc>,
}

/// Aggregated ratings for one template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Mean rating rounded to one decimal
    #[serde(default)]
    pub rating: f64,
    /// Number of submissions
    #[serde(default)]
    pub votes: u32,
    /// Sum of all submitted ratings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    /// Reviews in submission order
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl RatingRecord {
    /// Sum of all ratings, reconstructed from the mean when not persisted
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn total(&self) -> u32 {
        self.total
            .unwrap_or_else(|| (self.rating * f64::from(self.votes)).round().max(0.0) as u32)
    }

    /// Most recent review date
    #[must_use]
    pub fn latest_review(&self) -> Option<DateTime<Utc>> {
        self.reviews.iter().map(|review| review.date).max()
    }

    fn submit(&mut self, rating: u8, comment: Option<&str>, now: DateTime<Utc>) {
        let total = self.total() + u32::from(rating);
        self.votes += 1;
        self.total = Some(total);
        self.rating = (f64::from(total) / f64::from(self.votes) * 10.0).round() / 10.0;

        if let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) {
            self.reviews.push(Review {
                rating,
                comment: comment.to_string(),
                date: now,
            });
        }
    }
}

/// The ratings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingBook {
    /// Records by template name
    #[serde(default)]
    pub templates: BTreeMap<String, RatingRecord>,
    /// Editor-picked template names
    #[serde(default)]
    pub featured: Vec<String>,
    /// Currently popular template names
    #[serde(default)]
    pub trending: Vec<String>,
    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RatingBook {
    /// Record for a template, if it has been rated
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RatingRecord> {
        self.templates.get(name)
    }

    /// Mean rating, 0 when unrated
    #[must_use]
    pub fn rating_of(&self, name: &str) -> f64 {
        self.get(name).map_or(0.0, |record| record.rating)
    }

    /// Vote count, 0 when unrated
    #[must_use]
    pub fn votes_of(&self, name: &str) -> u32 {
        self.get(name).map_or(0, |record| record.votes)
    }

    /// Submit a rating for a template in `catalog`
    ///
    /// Nothing is mutated unless both the rating and the template name are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] for a rating outside 1..=5 and
    /// [`Error::NotFound`] when no template in `catalog` answers to `name`.
    pub fn add_rating(
        &mut self,
        catalog: &[Template],
        name: &str,
        rating: i64,
        comment: Option<&str>,
    ) -> Result<&RatingRecord> {
        self.add_rating_at(catalog, name, rating, comment, Utc::now())
    }

    /// [`add_rating`](Self::add_rating) with an explicit timestamp
    ///
    /// # Errors
    ///
    /// See [`add_rating`](Self::add_rating).
    pub fn add_rating_at(
        &mut self,
        catalog: &[Template],
        name: &str,
        rating: i64,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&RatingRecord> {
        let stars = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(&i64::from(*r)))
            .ok_or(Error::Range(rating))?;

        let key = catalog
            .iter()
            .find(|template| template.answers_to(name))
            .map(Template::display_name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let record = self.templates.entry(key).or_default();
        record.submit(stars, comment, now);
        debug!(template = name, rating = record.rating, votes = record.votes, "rating recorded");
        Ok(record)
    }
}

/// Data-access object for the ratings document
#[derive(Debug, Clone)]
pub struct RatingFile {
    path: PathBuf,
}

impl RatingFile {
    /// Ratings document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, returning an empty book when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<RatingBook> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Rewrite the whole document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn save(&self, book: &RatingBook) -> Result<()> {
        write_json(&self.path, book, "ratings")?;
        info!(path = %self.path.display(), templates = book.templates.len(), "saved ratings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn catalog() -> Vec<Template> {
        vec![serde_json::from_value(json!({ "name": "react-typescript-vite" })).unwrap()]
    }

    #[test]
    fn test_running_mean() {
        let catalog = catalog();
        let mut book = RatingBook::default();
        for rating in [5, 3, 4] {
            book.add_rating(&catalog, "react-typescript-vite", rating, None)
                .unwrap();
        }
        let record = book.get("react-typescript-vite").unwrap();
        assert_eq!(record.votes, 3);
        assert!((record.rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(record.total, Some(12));
        assert!(record.reviews.is_empty());
    }

    #[test]
    fn test_mean_is_order_independent() {
        let catalog = catalog();
        let orders = [[5, 3, 4], [4, 5, 3], [3, 4, 5]];
        let means: Vec<f64> = orders
            .iter()
            .map(|order| {
                let mut book = RatingBook::default();
                for rating in order {
                    book.add_rating(&catalog, "react-typescript-vite", *rating, None)
                        .unwrap();
                }
                book.rating_of("react-typescript-vite")
            })
            .collect();
        assert!(means.windows(2).all(|w| (w[0] - w[1]).abs() < f64::EPSILON));
    }

    #[test]
    fn test_mean_does_not_drift() {
        let catalog = catalog();
        let mut book = RatingBook::default();
        for rating in [5, 4, 4] {
            book.add_rating(&catalog, "react-typescript-vite", rating, None)
                .unwrap();
        }
        // 13 / 3 = 4.333..
        assert!((book.rating_of("react-typescript-vite") - 4.3).abs() < 1e-9);
        book.add_rating(&catalog, "react-typescript-vite", 5, None)
            .unwrap();
        // 18 / 4 = 4.5 exactly, not (4.3 * 3 + 5) / 4
        assert!((book.rating_of("react-typescript-vite") - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_is_rejected_without_mutation() {
        let catalog = catalog();
        let mut book = RatingBook::default();
        for rating in [0, 6, -1, 300] {
            let err = book
                .add_rating(&catalog, "react-typescript-vite", rating, Some("x"))
                .unwrap_err();
            assert!(matches!(err, Error::Range(r) if r == rating));
        }
        assert!(book.templates.is_empty());
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let mut book = RatingBook::default();
        let err = book.add_rating(&catalog(), "missing", 4, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(name) if name == "missing"));
        assert!(book.templates.is_empty());
    }

    #[test]
    fn test_reviews_keep_submission_order() {
        let catalog = catalog();
        let mut book = RatingBook::default();
        let start = Utc::now();
        book.add_rating_at(&catalog, "react-typescript-vite", 5, Some("first"), start)
            .unwrap();
        book.add_rating_at(&catalog, "react-typescript-vite", 2, Some("  "), start)
            .unwrap();
        book.add_rating_at(
            &catalog,
            "react-typescript-vite",
            3,
            Some("second"),
            start + chrono::Duration::seconds(5),
        )
        .unwrap();

        let record = book.get("react-typescript-vite").unwrap();
        let comments: Vec<&str> = record.reviews.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(comments, vec!["first", "second"]);
        assert_eq!(record.votes, 3);
        assert_eq!(record.latest_review(), Some(start + chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_legacy_record_without_total() {
        let mut book: RatingBook = serde_json::from_value(json!({
            "templates": {
                "react-typescript-vite": { "rating": 4.5, "votes": 2, "reviews": [] }
            }
        }))
        .unwrap();
        book.add_rating(&catalog(), "react-typescript-vite", 3, None)
            .unwrap();
        let record = book.get("react-typescript-vite").unwrap();
        assert_eq!(record.total, Some(12));
        assert!((record.rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let file = RatingFile::new(temp.path().join("ratings.json"));
        let mut book = file.load().unwrap();
        assert!(book.templates.is_empty());

        book.add_rating(&catalog(), "react-typescript-vite", 4, Some("Nice"))
            .unwrap();
        book.extra.insert("schema".to_string(), json!(1));
        file.save(&book).unwrap();

        assert_eq!(file.load().unwrap(), book);
    }
}
