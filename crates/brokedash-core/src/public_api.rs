//! Stable, public-facing helpers that wrap the internal service layer.
//!
//! Frontends (CLI, request handlers) call these instead of wiring the
//! services together themselves. Writes and ranking stay two separate
//! steps: submit first, then refresh with the chosen strategy.

use uuid::Uuid;

use brokedash_domain::{IncomeBracket, RankedEntry, UserProfile};

use crate::{
    leaderboard_service::{
        LeaderboardPage, LeaderboardQuery, LeaderboardService, RecomputeStrategy, RecomputeSummary,
        RefreshOutcome,
    },
    profile_service::ProfileService,
    stats_service::{CategoryBucket, StatsService, UserStanding},
    CoreError,
};

/// Outcome of a submission followed by its ranking refresh.
#[derive(Debug, Clone)]
pub struct ApiSubmission {
    pub profile: UserProfile,
    pub refresh: RefreshOutcome,
}

/// Stores a submission and refreshes the leaderboard according to `strategy`.
pub fn api_submit_profile(
    service: &LeaderboardService,
    id: Option<Uuid>,
    bracket_label: &str,
    monthly_spend: f64,
    strategy: RecomputeStrategy,
) -> Result<ApiSubmission, CoreError> {
    let bracket = IncomeBracket::from_label(bracket_label);
    let profile = ProfileService::submit(service.storage(), service.clock(), id, bracket, monthly_spend)?;
    let refresh = service.refresh_after_write(profile.id, strategy)?;
    Ok(ApiSubmission { profile, refresh })
}

/// Recomputes and persists the ranking for the whole population.
pub fn api_recompute_global(service: &LeaderboardService) -> Result<RecomputeSummary, CoreError> {
    service.recompute_global_ranking()
}

/// Recomputes and persists the ranking of a single user.
pub fn api_recompute_user(service: &LeaderboardService, id: Uuid) -> Result<RankedEntry, CoreError> {
    service.recompute_user_ranking(id)
}

/// Returns the top `limit` rows of the stored leaderboard.
pub fn api_leaderboard(
    service: &LeaderboardService,
    limit: Option<usize>,
) -> Result<Vec<RankedEntry>, CoreError> {
    service.leaderboard(limit)
}

/// Returns one sorted page of the stored leaderboard.
pub fn api_leaderboard_page(
    service: &LeaderboardService,
    query: &LeaderboardQuery,
) -> Result<LeaderboardPage, CoreError> {
    service.leaderboard_page(query)
}

/// Category histogram of the stored leaderboard.
pub fn api_distribution(service: &LeaderboardService) -> Result<Vec<CategoryBucket>, CoreError> {
    Ok(StatsService::distribution(&service.leaderboard(None)?))
}

/// Live standing of `id` against the current profile snapshot.
pub fn api_standing(service: &LeaderboardService, id: Uuid) -> Result<UserStanding, CoreError> {
    let profiles = service.storage().list_profiles()?;
    StatsService::standing(&profiles, id, service.policy())
}
