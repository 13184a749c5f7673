//! Leaderboard categories, one per decile of the rank distribution.
//!
//! Bucket 0 holds the most aggressive spenders (the rank 1 end of the
//! leaderboard) and bucket 9 the most frugal. Every feature resolves
//! categories through this table in that direction.

use std::fmt;

use serde::Serialize;

/// Number of buckets; each covers ten percentile points.
pub const CATEGORY_COUNT: usize = 10;

/// Display metadata for a single leaderboard bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDefinition {
    pub index: usize,
    pub name: &'static str,
    pub emoji: &'static str,
    pub range: &'static str,
}

impl CategoryDefinition {
    const fn new(index: usize, name: &'static str, emoji: &'static str, range: &'static str) -> Self {
        Self {
            index,
            name,
            emoji,
            range,
        }
    }

    /// Inclusive lower bound of the percentile range covered by the bucket.
    pub fn lower_percentile(&self) -> f64 {
        (self.index * 10) as f64
    }

    /// Exclusive upper bound of the percentile range covered by the bucket.
    pub fn upper_percentile(&self) -> f64 {
        ((self.index + 1) * 10) as f64
    }
}

impl fmt::Display for CategoryDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

pub const CATEGORIES: [CategoryDefinition; CATEGORY_COUNT] = [
    CategoryDefinition::new(0, "Broke Beginner", "😓", "0-9th"),
    CategoryDefinition::new(1, "Frugal Freshman", "🐣", "10-19th"),
    CategoryDefinition::new(2, "Savvy Sophomore", "📚", "20-29th"),
    CategoryDefinition::new(3, "Judicious Junior", "🤔", "30-39th"),
    CategoryDefinition::new(4, "Senior Saver", "💼", "40-49th"),
    CategoryDefinition::new(5, "Balanced Bachelor", "⚖️", "50-59th"),
    CategoryDefinition::new(6, "Master of Moderation", "🧘", "60-69th"),
    CategoryDefinition::new(7, "Doctorate in Dollars", "🎓", "70-79th"),
    CategoryDefinition::new(8, "Professor of Prosperity", "🏆", "80-89th"),
    CategoryDefinition::new(9, "Wealth Wizard", "🧙", "90-99th"),
];

/// Returns the bucket at `index`, clamping past-the-end values to the last bucket.
pub fn category_at(index: usize) -> &'static CategoryDefinition {
    &CATEGORIES[index.min(CATEGORY_COUNT - 1)]
}
