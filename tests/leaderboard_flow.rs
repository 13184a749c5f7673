mod common;

use std::sync::Arc;

use brokedash::{
    core::{
        public_api::{api_distribution, api_leaderboard, api_standing, api_submit_profile},
        LeaderboardService, ProfileStorage, RecomputeStrategy, RefreshOutcome,
    },
    domain::{RankingPolicy, CATEGORIES},
    storage::{JsonProfileStorage, StoragePaths},
};

#[test]
fn submissions_rank_biggest_relative_spenders_first() {
    let (_, service, _) = common::setup_test_env(RankingPolicy::Dense);

    let frugal =
        api_submit_profile(&service, None, "250k+", 500.0, RecomputeStrategy::Global).unwrap();
    let lavish =
        api_submit_profile(&service, None, "<100k", 6000.0, RecomputeStrategy::Global).unwrap();
    let middle =
        api_submit_profile(&service, None, "100k-150k", 3000.0, RecomputeStrategy::Global)
            .unwrap();

    let board = api_leaderboard(&service, None).unwrap();
    let order: Vec<_> = board.iter().map(|entry| entry.id).collect();
    assert_eq!(
        order,
        vec![lavish.profile.id, middle.profile.id, frugal.profile.id]
    );
    assert_eq!(board[0].category, CATEGORIES[3].name);
    assert_eq!(board[2].category, CATEGORIES[9].name);
}

#[test]
fn dense_policy_shares_ranks_between_equal_scores() {
    let (_, service, _) = common::setup_test_env(RankingPolicy::Dense);
    for spend in [1000.0, 1000.0, 200.0] {
        api_submit_profile(&service, None, "150k-250k", spend, RecomputeStrategy::Manual).unwrap();
    }
    service.recompute_global_ranking().unwrap();

    let ranks: Vec<u32> = api_leaderboard(&service, None)
        .unwrap()
        .iter()
        .map(|entry| entry.rank)
        .collect();
    assert_eq!(ranks, vec![1, 1, 3]);
}

#[test]
fn strict_policy_gives_every_profile_its_own_rank() {
    let (_, service, _) = common::setup_test_env(RankingPolicy::Strict);
    for spend in [1000.0, 1000.0, 200.0] {
        api_submit_profile(&service, None, "150k-250k", spend, RecomputeStrategy::Manual).unwrap();
    }
    service.recompute_global_ranking().unwrap();

    let ranks: Vec<u32> = api_leaderboard(&service, Some(10))
        .unwrap()
        .iter()
        .map(|entry| entry.rank)
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn user_strategy_ranks_only_the_writer() {
    let (storage, service, _) = common::setup_test_env(RankingPolicy::Dense);
    api_submit_profile(&service, None, "<100k", 100.0, RecomputeStrategy::Manual).unwrap();

    let submission =
        api_submit_profile(&service, None, "<100k", 8000.0, RecomputeStrategy::User).unwrap();

    match submission.refresh {
        RefreshOutcome::User(entry) => {
            assert_eq!(entry.rank, 1);
            assert_eq!(entry.percentile, 50.0);
        }
        other => panic!("unexpected refresh {other:?}"),
    }
    assert_eq!(storage.list_ranked_entries().unwrap().len(), 1);
    assert_eq!(storage.list_profiles().unwrap().len(), 2);
}

#[test]
fn leaderboard_survives_reopening_storage() {
    let paths = StoragePaths::under(&common::temp_home());
    let storage = Arc::new(JsonProfileStorage::new(paths.clone()).unwrap());
    let service = LeaderboardService::new(storage, RankingPolicy::Dense);
    let submitted =
        api_submit_profile(&service, None, "100k-150k", 1000.0, RecomputeStrategy::Global)
            .unwrap();

    let reopened = JsonProfileStorage::new(paths).unwrap();
    let entries = reopened.list_ranked_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, submitted.profile.id);
    assert_eq!(entries[0].days_till_broke, 10);
}

#[test]
fn standing_and_distribution_agree_with_the_snapshot() {
    let (_, service, _) = common::setup_test_env(RankingPolicy::Dense);
    let mut ids = Vec::new();
    for step in 1..=10 {
        let submission = api_submit_profile(
            &service,
            None,
            "100k-150k",
            step as f64 * 500.0,
            RecomputeStrategy::Manual,
        )
        .unwrap();
        ids.push(submission.profile.id);
    }
    service.recompute_global_ranking().unwrap();

    let top = api_standing(&service, ids[9]).unwrap();
    assert_eq!(top.entry.rank, 1);
    assert_eq!(top.population, 10);
    assert_eq!(top.spend_more_than, 95.0);

    let buckets = api_distribution(&service).unwrap();
    assert_eq!(buckets.iter().map(|bucket| bucket.count).sum::<usize>(), 10);
    assert_eq!(buckets[0].count, 0);
    assert_eq!(buckets[9].count, 2);
}
