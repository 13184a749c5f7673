//! Aggregations behind the stats page: category histogram and personal standing.

use uuid::Uuid;

use brokedash_domain::{RankedEntry, RankingPolicy, UserProfile, CATEGORIES};

use crate::{ranking_engine::RankingEngine, CoreError};

/// Population count for one leaderboard category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket {
    pub index: usize,
    pub name: &'static str,
    pub emoji: &'static str,
    pub range: &'static str,
    pub count: usize,
    /// Share of the population in percent; zero for an empty leaderboard.
    pub share: f64,
}

/// Where a single user stands against everybody else.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStanding {
    pub entry: RankedEntry,
    pub population: usize,
    /// "You spend more than X% of people", relative to income.
    pub spend_more_than: f64,
}

pub struct StatsService;

impl StatsService {
    /// Counts entries per category, always returning every bucket in category order.
    pub fn distribution(entries: &[RankedEntry]) -> Vec<CategoryBucket> {
        let total = entries.len();
        CATEGORIES
            .iter()
            .map(|category| {
                let count = entries
                    .iter()
                    .filter(|entry| entry.category == category.name)
                    .count();
                let share = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                };
                CategoryBucket {
                    index: category.index,
                    name: category.name,
                    emoji: category.emoji,
                    range: category.range,
                    count,
                    share,
                }
            })
            .collect()
    }

    /// Computes the standing of `id` from a fresh ranking of `profiles`.
    pub fn standing(
        profiles: &[UserProfile],
        id: Uuid,
        policy: RankingPolicy,
    ) -> Result<UserStanding, CoreError> {
        let entries = RankingEngine::rank(profiles, policy);
        let scores: Vec<f64> = entries.iter().map(|entry| entry.score).collect();
        let entry = entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or(CoreError::ProfileNotFound(id))?;
        let spend_more_than =
            RankingEngine::midpoint_percentile(entry.score, &scores).unwrap_or(0.0);
        Ok(UserStanding {
            entry,
            population: entries.len(),
            spend_more_than,
        })
    }
}
