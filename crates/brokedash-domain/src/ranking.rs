//! Ranking policies and the derived leaderboard entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::income::IncomeBracket;

/// Sentinel runway for users that report no spend at all.
pub const NEVER_BROKE: u32 = u32::MAX;

/// How equal scores are turned into ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Rank is the 1-based position after sorting; ties are broken by input order.
    Strict,
    /// Equal scores share the rank of the first entry holding that score.
    #[default]
    Dense,
}

impl RankingPolicy {
    /// Parses a policy name, returning `None` for anything unrecognised.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(RankingPolicy::Strict),
            "dense" => Some(RankingPolicy::Dense),
            _ => None,
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RankingPolicy::Strict => "strict",
            RankingPolicy::Dense => "dense",
        };
        f.write_str(label)
    }
}

/// When the leaderboard is refreshed after a profile write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecomputeStrategy {
    /// Re-rank the whole population.
    #[default]
    Global,
    /// Re-rank only the writer against the current snapshot.
    User,
    /// Leave the snapshot alone until an explicit recompute.
    Manual,
}

impl RecomputeStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Some(RecomputeStrategy::Global),
            "user" => Some(RecomputeStrategy::User),
            "manual" => Some(RecomputeStrategy::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for RecomputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecomputeStrategy::Global => "global",
            RecomputeStrategy::User => "user",
            RecomputeStrategy::Manual => "manual",
        };
        f.write_str(label)
    }
}

/// One row of the leaderboard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedEntry {
    pub id: Uuid,
    pub score: f64,
    pub rank: u32,
    pub percentile: f64,
    pub category: String,
    pub emoji: String,
    pub days_till_broke: u32,
    pub income_bracket: IncomeBracket,
    pub monthly_spend: f64,
    pub updated_at: DateTime<Utc>,
}

impl RankedEntry {
    /// Returns `true` when the user reported no spend.
    pub fn never_broke(&self) -> bool {
        self.days_till_broke == NEVER_BROKE
    }

}

/// Human readable runway, `never` for the [`NEVER_BROKE`] sentinel.
pub fn days_till_broke_label(days: u32) -> String {
    if days == NEVER_BROKE {
        "never".into()
    } else {
        days.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_known_names() {
        assert_eq!(RankingPolicy::parse("Dense"), Some(RankingPolicy::Dense));
        assert_eq!(RankingPolicy::parse(" strict "), Some(RankingPolicy::Strict));
        assert_eq!(RankingPolicy::parse("olympic"), None);
        assert_eq!(RankingPolicy::default(), RankingPolicy::Dense);
    }

    #[test]
    fn strategy_round_trips_through_its_label() {
        for strategy in [
            RecomputeStrategy::Global,
            RecomputeStrategy::User,
            RecomputeStrategy::Manual,
        ] {
            assert_eq!(RecomputeStrategy::parse(&strategy.to_string()), Some(strategy));
        }
        assert_eq!(RecomputeStrategy::parse("nightly"), None);
    }

    #[test]
    fn sentinel_runway_renders_as_never() {
        let entry = RankedEntry {
            id: Uuid::nil(),
            score: 0.0,
            rank: 1,
            percentile: 100.0,
            category: "Wealth Wizard".into(),
            emoji: "🧙".into(),
            days_till_broke: NEVER_BROKE,
            income_bracket: IncomeBracket::Over250k,
            monthly_spend: 0.0,
            updated_at: Utc::now(),
        };
        assert!(entry.never_broke());
        assert_eq!(days_till_broke_label(entry.days_till_broke), "never");
        assert_eq!(days_till_broke_label(12), "12");
    }
}
