//! Scoring, ranking and categorisation of user spend profiles.
//!
//! Everything here is a pure function over a snapshot of profiles; callers
//! decide when to run it and where to persist the result.

use brokedash_domain::{
    category_at, CategoryDefinition, IncomeBracket, RankedEntry, RankingPolicy, UserProfile,
    CATEGORY_COUNT, CEILING_INCOME, NEVER_BROKE,
};

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;
const MAX_MIDPOINT_PERCENTILE: f64 = 99.0;

pub struct RankingEngine;

impl RankingEngine {
    /// Spend relative to means for a single profile. Higher means more aggressive spending.
    pub fn score(profile: &UserProfile) -> f64 {
        Self::score_for(profile.income_bracket, profile.monthly_spend)
    }

    /// Monthly spend as a share of monthly income, inflated for lower brackets.
    pub fn score_for(bracket: IncomeBracket, monthly_spend: f64) -> f64 {
        let annual = bracket.annual_income();
        let spend_ratio = clamp_spend(monthly_spend) / (annual / MONTHS_PER_YEAR);
        let income_multiplier = 1.0 + (1.0 - annual / CEILING_INCOME);
        spend_ratio * income_multiplier
    }

    /// Ranks every profile, highest score first, and derives its leaderboard entry.
    ///
    /// The sort is stable, so under [`RankingPolicy::Strict`] ties keep the
    /// order in which `profiles` were supplied. Each entry carries the
    /// `updated_at` of its profile, so the output depends only on the input.
    pub fn rank(profiles: &[UserProfile], policy: RankingPolicy) -> Vec<RankedEntry> {
        if profiles.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&UserProfile, f64)> = profiles
            .iter()
            .map(|profile| (profile, Self::score(profile)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let scores: Vec<f64> = scored.iter().map(|(_, score)| *score).collect();
        let ranks = Self::assign_ranks(&scores, policy);
        let total = scored.len();

        scored
            .into_iter()
            .zip(ranks)
            .map(|((profile, score), rank)| {
                let percentile = Self::rank_percentile(rank, total).unwrap_or(0.0);
                let category = Self::categorize(percentile);
                RankedEntry {
                    id: profile.id,
                    score,
                    rank,
                    percentile,
                    category: category.name.to_string(),
                    emoji: category.emoji.to_string(),
                    days_till_broke: Self::days_till_broke(
                        profile.income_bracket,
                        profile.monthly_spend,
                    ),
                    income_bracket: profile.income_bracket,
                    monthly_spend: clamp_spend(profile.monthly_spend),
                    updated_at: profile.updated_at,
                }
            })
            .collect()
    }

    /// Turns scores sorted in descending order into 1-based ranks.
    pub fn assign_ranks(sorted_scores: &[f64], policy: RankingPolicy) -> Vec<u32> {
        let mut ranks = Vec::with_capacity(sorted_scores.len());
        for (idx, score) in sorted_scores.iter().enumerate() {
            let position = idx as u32 + 1;
            let rank = match policy {
                RankingPolicy::Strict => position,
                RankingPolicy::Dense => match ranks.last() {
                    Some(previous) if sorted_scores[idx - 1] == *score => *previous,
                    _ => position,
                },
            };
            ranks.push(rank);
        }
        ranks
    }

    /// `rank * 100 / total`, or `None` for an empty population or a zero rank.
    pub fn rank_percentile(rank: u32, total: usize) -> Option<f64> {
        if total == 0 || rank == 0 {
            return None;
        }
        Some(rank as f64 * 100.0 / total as f64)
    }

    /// Decile bucket for a percentile, clamped to `[0, CATEGORY_COUNT - 1]`.
    pub fn category_index(percentile: f64) -> usize {
        if !percentile.is_finite() || percentile <= 0.0 {
            return 0;
        }
        ((percentile / 10.0).floor() as usize).min(CATEGORY_COUNT - 1)
    }

    pub fn categorize(percentile: f64) -> &'static CategoryDefinition {
        category_at(Self::category_index(percentile))
    }

    /// Category for a rank within a population of `total`.
    pub fn categorize_rank(rank: u32, total: usize) -> Option<&'static CategoryDefinition> {
        Self::rank_percentile(rank, total).map(Self::categorize)
    }

    /// Share of the population spending less than `score`, counting ties as half.
    ///
    /// Capped at 99 so the top spender never reads as "more than 100%".
    pub fn midpoint_percentile(score: f64, population: &[f64]) -> Option<f64> {
        if population.is_empty() {
            return None;
        }
        let below = population.iter().filter(|other| **other < score).count();
        let equal = population.iter().filter(|other| **other == score).count();
        let raw = (below as f64 + 0.5 * equal as f64) / population.len() as f64 * 100.0;
        Some(raw.min(MAX_MIDPOINT_PERCENTILE))
    }

    /// Whole days until a month of spend at the current rate exhausts daily income.
    ///
    /// Zero spend returns [`NEVER_BROKE`]; very small spend saturates to it.
    pub fn days_till_broke(bracket: IncomeBracket, monthly_spend: f64) -> u32 {
        let spend = clamp_spend(monthly_spend);
        if spend == 0.0 {
            return NEVER_BROKE;
        }
        let daily_income = bracket.annual_income() / DAYS_PER_YEAR;
        let daily_spend = spend / DAYS_PER_MONTH;
        let days = (daily_income / daily_spend).floor();
        if days <= 0.0 {
            0
        } else {
            days as u32
        }
    }
}

fn clamp_spend(monthly_spend: f64) -> f64 {
    if monthly_spend.is_finite() {
        monthly_spend.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_inflates_lower_brackets() {
        let low = RankingEngine::score_for(IncomeBracket::Under100k, 1000.0);
        let top = RankingEngine::score_for(IncomeBracket::Over250k, 1000.0);

        assert!((low - 1000.0 / 6250.0 * 1.75).abs() < 1e-12);
        assert!((top - 1000.0 / 25_000.0).abs() < 1e-12);
        assert!(low > top);
    }

    #[test]
    fn score_is_never_negative() {
        for bracket in IncomeBracket::ALL {
            for spend in [0.0, 0.01, 15.0, 999.99, 20_833.0, -50.0, f64::NAN] {
                assert!(RankingEngine::score_for(bracket, spend) >= 0.0);
            }
        }
    }

    #[test]
    fn dense_ranks_share_first_occurrence() {
        let ranks = RankingEngine::assign_ranks(&[5.0, 3.0, 3.0, 1.0], RankingPolicy::Dense);
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn strict_ranks_are_positions() {
        let ranks = RankingEngine::assign_ranks(&[5.0, 3.0, 3.0, 1.0], RankingPolicy::Strict);
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn three_user_scenario_buckets() {
        let ranks = RankingEngine::assign_ranks(&[5.0, 3.0, 3.0], RankingPolicy::Dense);
        assert_eq!(ranks, vec![1, 2, 2]);

        let percentiles: Vec<f64> = ranks
            .iter()
            .map(|rank| RankingEngine::rank_percentile(*rank, 3).unwrap())
            .collect();
        assert!((percentiles[0] - 33.333).abs() < 0.01);
        assert!((percentiles[1] - 66.666).abs() < 0.01);

        let buckets: Vec<usize> = percentiles
            .iter()
            .map(|p| RankingEngine::category_index(*p))
            .collect();
        assert_eq!(buckets, vec![3, 6, 6]);
    }

    #[test]
    fn single_profile_lands_in_last_bucket() {
        let profile = UserProfile::new(IncomeBracket::From100kTo150k, 500.0);
        let entries = RankingEngine::rank(&[profile], RankingPolicy::Dense);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].percentile, 100.0);
        assert_eq!(entries[0].category, "Wealth Wizard");
        assert_eq!(
            RankingEngine::midpoint_percentile(entries[0].score, &[entries[0].score]),
            Some(50.0)
        );
    }

    #[test]
    fn empty_population_yields_nothing() {
        assert!(RankingEngine::rank(&[], RankingPolicy::Dense).is_empty());
        assert_eq!(RankingEngine::rank_percentile(1, 0), None);
        assert_eq!(RankingEngine::midpoint_percentile(1.0, &[]), None);
        assert!(RankingEngine::categorize_rank(1, 0).is_none());
    }

    #[test]
    fn category_index_clamps() {
        assert_eq!(RankingEngine::category_index(0.0), 0);
        assert_eq!(RankingEngine::category_index(9.99), 0);
        assert_eq!(RankingEngine::category_index(10.0), 1);
        assert_eq!(RankingEngine::category_index(99.9), 9);
        assert_eq!(RankingEngine::category_index(100.0), 9);
        assert_eq!(RankingEngine::category_index(-3.0), 0);
        assert_eq!(RankingEngine::category_index(f64::NAN), 0);
    }

    #[test]
    fn midpoint_percentile_counts_ties_as_half() {
        let population = [1.0, 2.0, 2.0, 4.0];
        assert_eq!(RankingEngine::midpoint_percentile(2.0, &population), Some(50.0));
        assert_eq!(RankingEngine::midpoint_percentile(1.0, &population), Some(12.5));
        assert_eq!(RankingEngine::midpoint_percentile(4.0, &population), Some(87.5));
        assert_eq!(
            RankingEngine::midpoint_percentile(10.0, &population),
            Some(MAX_MIDPOINT_PERCENTILE)
        );
    }

    #[test]
    fn days_till_broke_matches_reference_case() {
        assert_eq!(
            RankingEngine::days_till_broke(IncomeBracket::From100kTo150k, 1000.0),
            10
        );
    }

    #[test]
    fn days_till_broke_zero_spend_is_sentinel() {
        assert_eq!(
            RankingEngine::days_till_broke(IncomeBracket::Under100k, 0.0),
            NEVER_BROKE
        );
        assert_eq!(
            RankingEngine::days_till_broke(IncomeBracket::Under100k, -20.0),
            NEVER_BROKE
        );
    }

    #[test]
    fn days_till_broke_is_monotone() {
        for bracket in IncomeBracket::ALL {
            let mut previous = u32::MAX;
            for spend in [0.0, 1.0, 10.0, 250.0, 1000.0, 5000.0, 20_833.0] {
                let days = RankingEngine::days_till_broke(bracket, spend);
                assert!(days <= previous);
                previous = days;
            }
        }
        for spend in [1.0, 333.0, 1000.0, 8000.0] {
            let mut previous = 0;
            for bracket in IncomeBracket::ALL {
                let days = RankingEngine::days_till_broke(bracket, spend);
                assert!(days >= previous);
                previous = days;
            }
        }
    }

    #[test]
    fn rank_orders_by_score_descending() {
        let frugal = UserProfile::new(IncomeBracket::Over250k, 100.0);
        let splurger = UserProfile::new(IncomeBracket::Under100k, 3000.0);
        let middle = UserProfile::new(IncomeBracket::From150kTo250k, 1500.0);

        let entries = RankingEngine::rank(
            &[frugal.clone(), splurger.clone(), middle.clone()],
            RankingPolicy::Dense,
        );

        let ids: Vec<_> = entries.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![splurger.id, middle.id, frugal.id]);
        assert_eq!(entries[0].category, "Judicious Junior");
        assert_eq!(entries[2].category, "Wealth Wizard");
        assert_eq!(entries[0].updated_at, splurger.updated_at);
        assert_eq!(entries[2].updated_at, frugal.updated_at);
    }

    #[test]
    fn strict_ties_keep_input_order() {
        let first = UserProfile::new(IncomeBracket::Under100k, 200.0);
        let second = UserProfile::new(IncomeBracket::Under100k, 200.0);

        let entries = RankingEngine::rank(
            &[first.clone(), second.clone()],
            RankingPolicy::Strict,
        );

        assert_eq!(entries[0].id, first.id);
        assert_eq!(entries[1].id, second.id);
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn bucket_is_a_function_of_rank_and_total() {
        let profiles: Vec<UserProfile> = (0..37)
            .map(|idx| UserProfile::new(IncomeBracket::ALL[idx % 4], (idx * 37 % 23) as f64 * 50.0))
            .collect();
        let total = profiles.len();
        let entries = RankingEngine::rank(&profiles, RankingPolicy::Dense);

        for entry in &entries {
            let expected = RankingEngine::categorize_rank(entry.rank, total).unwrap();
            assert_eq!(entry.category, expected.name);
            assert_eq!(entry.emoji, expected.emoji);
        }
    }
}
