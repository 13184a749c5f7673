//! Recomputes and serves the persisted leaderboard snapshot.
//!
//! Every pass reads the full profile snapshot, ranks it with
//! [`RankingEngine`], and writes the result back. Passes are serialized
//! through a single-writer lock so two recomputations never interleave
//! their reads and writes.

use std::{
    cmp::Ordering,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, info};
use uuid::Uuid;

use brokedash_domain::{RankedEntry, RankingPolicy};

pub use brokedash_domain::RecomputeStrategy;

use crate::{
    ranking_engine::RankingEngine,
    storage::ProfileStorage,
    time::{Clock, SystemClock},
    CoreError,
};

/// Rows per leaderboard page.
pub const LEADERBOARD_PAGE_SIZE: usize = 6;

/// Column the leaderboard view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardSort {
    #[default]
    Rank,
    DaysTillBroke,
    /// Bracket order, lowest bracket first.
    Income,
    Spend,
}

impl LeaderboardSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rank" => Some(LeaderboardSort::Rank),
            "days" | "days_till_broke" => Some(LeaderboardSort::DaysTillBroke),
            "income" | "bracket" => Some(LeaderboardSort::Income),
            "spend" => Some(LeaderboardSort::Spend),
            _ => None,
        }
    }

    fn compare(self, a: &RankedEntry, b: &RankedEntry) -> Ordering {
        match self {
            LeaderboardSort::Rank => a.rank.cmp(&b.rank),
            LeaderboardSort::DaysTillBroke => a.days_till_broke.cmp(&b.days_till_broke),
            LeaderboardSort::Income => a.income_bracket.cmp(&b.income_bracket),
            LeaderboardSort::Spend => a.monthly_spend.total_cmp(&b.monthly_spend),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sorted, paged view over the stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub sort: LeaderboardSort,
    pub direction: SortDirection,
    /// Zero-based page; past-the-end pages clamp to the last one.
    pub page: usize,
    pub page_size: usize,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            sort: LeaderboardSort::default(),
            direction: SortDirection::default(),
            page: 0,
            page_size: LEADERBOARD_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardPage {
    pub entries: Vec<RankedEntry>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl LeaderboardQuery {
    /// Orders `entries` (already in rank order) and cuts out the requested page.
    ///
    /// The sort is stable, so rows with equal keys stay in rank order in
    /// both directions.
    pub fn apply(&self, mut entries: Vec<RankedEntry>) -> LeaderboardPage {
        let sort = self.sort;
        match self.direction {
            SortDirection::Ascending => entries.sort_by(|a, b| sort.compare(a, b)),
            SortDirection::Descending => entries.sort_by(|a, b| sort.compare(b, a)),
        }

        let total = entries.len();
        let page_size = self.page_size.max(1);
        let page_count = total.div_ceil(page_size);
        let page = self.page.min(page_count.saturating_sub(1));
        let entries = entries
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect();
        LeaderboardPage {
            entries,
            page,
            page_count,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub updated_count: usize,
}

/// Result of [`LeaderboardService::refresh_after_write`].
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Global(RecomputeSummary),
    User(RankedEntry),
    Skipped,
}

pub struct LeaderboardService {
    storage: Arc<dyn ProfileStorage>,
    clock: Arc<dyn Clock>,
    policy: RankingPolicy,
    recompute_lock: Mutex<()>,
}

impl LeaderboardService {
    pub fn new(storage: Arc<dyn ProfileStorage>, policy: RankingPolicy) -> Self {
        Self::with_clock(storage, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn ProfileStorage>,
        policy: RankingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            clock,
            policy,
            recompute_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    pub fn storage(&self) -> &dyn ProfileStorage {
        self.storage.as_ref()
    }

    /// Clock used to stamp profile writes made through this service.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Ranks the whole population and replaces the stored snapshot.
    pub fn recompute_global_ranking(&self) -> Result<RecomputeSummary, CoreError> {
        let _guard = self.lock()?;
        let profiles = self.storage.list_profiles()?;
        info!(
            profiles = profiles.len(),
            policy = %self.policy,
            "recomputing global ranking"
        );
        let entries = RankingEngine::rank(&profiles, self.policy);
        self.storage.replace_ranked_entries(&entries)?;
        info!(updated = entries.len(), "global ranking stored");
        Ok(RecomputeSummary {
            updated_count: entries.len(),
        })
    }

    /// Ranks one user against the current population and stores only that entry.
    ///
    /// Other users' rows are left as they were; run a global pass to refresh them.
    pub fn recompute_user_ranking(&self, id: Uuid) -> Result<RankedEntry, CoreError> {
        let _guard = self.lock()?;
        if self.storage.get_profile(id)?.is_none() {
            return Err(CoreError::ProfileNotFound(id));
        }
        let profiles = self.storage.list_profiles()?;
        let entry = RankingEngine::rank(&profiles, self.policy)
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(CoreError::ProfileNotFound(id))?;
        self.storage
            .upsert_ranked_entries(std::slice::from_ref(&entry))?;
        debug!(
            profile = %id,
            rank = entry.rank,
            population = profiles.len(),
            "user ranking stored"
        );
        Ok(entry)
    }

    /// Applies the configured trigger after `id` was written.
    pub fn refresh_after_write(
        &self,
        id: Uuid,
        strategy: RecomputeStrategy,
    ) -> Result<RefreshOutcome, CoreError> {
        match strategy {
            RecomputeStrategy::Global => self.recompute_global_ranking().map(RefreshOutcome::Global),
            RecomputeStrategy::User => self.recompute_user_ranking(id).map(RefreshOutcome::User),
            RecomputeStrategy::Manual => Ok(RefreshOutcome::Skipped),
        }
    }

    /// Returns the stored snapshot ordered by rank, optionally truncated.
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<RankedEntry>, CoreError> {
        let mut entries = self.storage.list_ranked_entries()?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Returns one sorted page of the stored snapshot.
    pub fn leaderboard_page(&self, query: &LeaderboardQuery) -> Result<LeaderboardPage, CoreError> {
        Ok(query.apply(self.storage.list_ranked_entries()?))
    }

    /// Looks up the stored entry for a single user.
    pub fn entry(&self, id: Uuid) -> Result<Option<RankedEntry>, CoreError> {
        Ok(self
            .storage
            .list_ranked_entries()?
            .into_iter()
            .find(|entry| entry.id == id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.recompute_lock
            .lock()
            .map_err(|_| CoreError::InvalidOperation("recompute lock poisoned".into()))
    }
}
