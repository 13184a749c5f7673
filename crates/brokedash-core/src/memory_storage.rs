//! Process-local storage backend, handy for tests and ephemeral sessions.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use brokedash_domain::{RankedEntry, UserProfile};

use crate::{
    storage::{sort_entries, ProfileStorage},
    CoreError,
};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<UserProfile>,
    entries: HashMap<Uuid, RankedEntry>,
}

/// Keeps profiles in insertion order and the leaderboard keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryProfileStorage {
    state: RwLock<MemoryState>,
}

impl InMemoryProfileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the backend with existing profiles.
    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                profiles,
                entries: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, CoreError> {
        self.state
            .read()
            .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, CoreError> {
        self.state
            .write()
            .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))
    }
}

impl ProfileStorage for InMemoryProfileStorage {
    fn list_profiles(&self) -> Result<Vec<UserProfile>, CoreError> {
        Ok(self.read()?.profiles.clone())
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        Ok(self
            .read()?
            .profiles
            .iter()
            .find(|profile| profile.id == id)
            .cloned())
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        let mut state = self.write()?;
        match state.profiles.iter_mut().find(|stored| stored.id == profile.id) {
            Some(stored) => *stored = profile.clone(),
            None => state.profiles.push(profile.clone()),
        }
        Ok(())
    }

    fn upsert_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError> {
        let mut state = self.write()?;
        for entry in entries {
            state.entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    fn replace_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError> {
        let replacement = entries
            .iter()
            .map(|entry| (entry.id, entry.clone()))
            .collect();
        self.write()?.entries = replacement;
        Ok(())
    }

    fn list_ranked_entries(&self) -> Result<Vec<RankedEntry>, CoreError> {
        let mut entries: Vec<RankedEntry> = self.read()?.entries.values().cloned().collect();
        sort_entries(&mut entries);
        Ok(entries)
    }
}
