use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use brokedash_domain::{RankedEntry, UserProfile};

use crate::CoreError;

/// Abstraction over persistence backends holding profiles and the leaderboard snapshot.
pub trait ProfileStorage: Send + Sync {
    fn list_profiles(&self) -> Result<Vec<UserProfile>, CoreError>;
    fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, CoreError>;
    /// Inserts the profile or replaces the stored one with the same id.
    fn save_profile(&self, profile: &UserProfile) -> Result<(), CoreError>;
    /// Inserts or replaces entries by id, leaving every other entry untouched.
    fn upsert_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError>;
    /// Atomically swaps the whole leaderboard snapshot for `entries`.
    fn replace_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError>;
    /// Returns the stored leaderboard ordered by rank.
    fn list_ranked_entries(&self) -> Result<Vec<RankedEntry>, CoreError>;
}

/// Orders entries by rank, then by id so ties read the same on every call.
pub fn sort_entries(entries: &mut [RankedEntry]) {
    entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
}

/// Detects leaderboard rows that no longer reflect the stored profiles.
pub fn snapshot_warnings(profiles: &[UserProfile], entries: &[RankedEntry]) -> Vec<String> {
    let by_id: HashMap<Uuid, &UserProfile> =
        profiles.iter().map(|profile| (profile.id, profile)).collect();
    let ranked: HashSet<Uuid> = entries.iter().map(|entry| entry.id).collect();
    let mut warnings = Vec::new();

    for entry in entries {
        match by_id.get(&entry.id) {
            None => warnings.push(format!("entry {} references unknown profile", entry.id)),
            Some(profile) => {
                if profile.income_bracket != entry.income_bracket
                    || profile.monthly_spend != entry.monthly_spend
                {
                    warnings.push(format!(
                        "entry {} is stale: profile changed since last ranking",
                        entry.id
                    ));
                }
            }
        }
    }
    for profile in profiles {
        if !ranked.contains(&profile.id) {
            warnings.push(format!("profile {} has not been ranked yet", profile.id));
        }
    }
    warnings
}
