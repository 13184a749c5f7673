use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use brokedash_core::{
    storage::{sort_entries, ProfileStorage},
    CoreError,
};
use brokedash_domain::{RankedEntry, UserProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

const JSON_EXTENSION: &str = "json";
const PROFILES_FILE: &str = "profiles.json";
const LEADERBOARD_FILE: &str = "brokerank.json";
const BACKUP_PREFIX: &str = "brokerank";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directory layout used by [`JsonProfileStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// Places backups in a `backups` folder next to the data files.
    pub fn under(base: &Path) -> Self {
        Self {
            data_root: base.to_path_buf(),
            backup_root: base.join("backups"),
        }
    }
}

/// Describes a saved copy of a previous leaderboard snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotBackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Filesystem-backed JSON persistence for profiles and the leaderboard.
///
/// Writes go through a temporary file followed by a rename, and every
/// read-modify-write runs under an internal lock.
#[derive(Debug)]
pub struct JsonProfileStorage {
    paths: StoragePaths,
    retention: usize,
    write_lock: Mutex<()>,
}

impl JsonProfileStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        })
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.paths.data_root.join(PROFILES_FILE)
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.paths.data_root.join(LEADERBOARD_FILE)
    }

    fn backup_path(&self, backup: &str) -> PathBuf {
        self.paths.backup_root.join(backup)
    }

    /// Lists leaderboard backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<SnapshotBackupInfo>, CoreError> {
        let dir = &self.paths.backup_root;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !is_backup_name(file_name) {
                continue;
            }
            let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            entries.push(SnapshotBackupInfo {
                id: file_name.to_string(),
                created_at: parse_backup_timestamp(file_name),
                size_bytes,
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse(backup_sort_key(&info.id)));
        Ok(entries)
    }

    /// Copies a backup over the live leaderboard and returns its entries.
    ///
    /// Only names from [`list_backups`](Self::list_backups) are accepted. The
    /// live snapshot is backed up first so a restore can itself be undone.
    pub fn restore_backup(&self, backup_id: &str) -> Result<Vec<RankedEntry>, CoreError> {
        if !is_backup_name(backup_id) {
            return Err(CoreError::Storage(format!(
                "`{}` is not a leaderboard backup name",
                backup_id
            )));
        }
        let _guard = self.lock()?;
        let source = self.backup_path(backup_id);
        if !source.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup_id
            )));
        }
        let mut entries: Vec<RankedEntry> = read_json(&source)?;
        sort_entries(&mut entries);
        let previous = self.backup_current_leaderboard()?;
        write_json(&self.leaderboard_path(), &entries)?;
        info!(
            backup = backup_id,
            previous = previous.as_deref().unwrap_or("none"),
            entries = entries.len(),
            "leaderboard restored"
        );
        Ok(entries)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("json storage lock poisoned".into()))
    }

    fn read_profiles(&self) -> Result<Vec<UserProfile>, CoreError> {
        read_json_or_default(&self.profiles_path())
    }

    fn read_entries(&self) -> Result<Vec<RankedEntry>, CoreError> {
        read_json_or_default(&self.leaderboard_path())
    }

    fn backup_current_leaderboard(&self) -> Result<Option<String>, CoreError> {
        let current = self.leaderboard_path();
        if !current.exists() {
            return Ok(None);
        }
        fs::create_dir_all(&self.paths.backup_root)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_name = format!("{}_{}.{}", BACKUP_PREFIX, timestamp, JSON_EXTENSION);
        let mut counter = 1;
        while self.backup_path(&file_name).exists() {
            file_name = format!(
                "{}_{}_{}.{}",
                BACKUP_PREFIX, timestamp, counter, JSON_EXTENSION
            );
            counter += 1;
        }
        fs::copy(&current, self.backup_path(&file_name))?;
        self.prune_backups()?;
        debug!(backup = %file_name, "leaderboard backed up");
        Ok(Some(file_name))
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "could not prune leaderboard backup");
            }
        }
        Ok(())
    }
}

impl ProfileStorage for JsonProfileStorage {
    fn list_profiles(&self) -> Result<Vec<UserProfile>, CoreError> {
        self.read_profiles()
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        Ok(self
            .read_profiles()?
            .into_iter()
            .find(|profile| profile.id == id))
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        let mut profiles = self.read_profiles()?;
        match profiles.iter_mut().find(|stored| stored.id == profile.id) {
            Some(stored) => *stored = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        write_json(&self.profiles_path(), &profiles)
    }

    fn upsert_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        let mut stored = self.read_entries()?;
        for entry in entries {
            match stored.iter_mut().find(|existing| existing.id == entry.id) {
                Some(existing) => *existing = entry.clone(),
                None => stored.push(entry.clone()),
            }
        }
        sort_entries(&mut stored);
        write_json(&self.leaderboard_path(), &stored)
    }

    fn replace_ranked_entries(&self, entries: &[RankedEntry]) -> Result<(), CoreError> {
        let _guard = self.lock()?;
        self.backup_current_leaderboard()?;
        let mut replacement = entries.to_vec();
        sort_entries(&mut replacement);
        write_json(&self.leaderboard_path(), &replacement)
    }

    fn list_ranked_entries(&self) -> Result<Vec<RankedEntry>, CoreError> {
        let mut entries = self.read_entries()?;
        sort_entries(&mut entries);
        Ok(entries)
    }
}

/// Reads a JSON document, returning `T::default()` when the file is missing or blank.
fn read_json_or_default<T>(path: &Path) -> Result<T, CoreError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn read_json<T>(path: &Path) -> Result<T, CoreError>
where
    T: DeserializeOwned,
{
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn write_json<T>(path: &Path, value: &T) -> Result<(), CoreError>
where
    T: Serialize + ?Sized,
{
    let data =
        serde_json::to_string_pretty(value).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// `brokerank_*.json` with no path components.
fn is_backup_name(name: &str) -> bool {
    !name.contains(['/', '\\'])
        && !name.contains("..")
        && name.starts_with(&format!("{}_", BACKUP_PREFIX))
        && name.ends_with(&format!(".{}", JSON_EXTENSION))
}

fn backup_sort_key(name: &str) -> (Option<DateTime<Utc>>, u32) {
    let counter = name
        .strip_suffix(&format!(".{}", JSON_EXTENSION))
        .and_then(|stem| stem.strip_prefix(&format!("{}_", BACKUP_PREFIX)))
        .and_then(|rest| rest.get(15..))
        .and_then(|suffix| suffix.strip_prefix('_'))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0);
    (parse_backup_timestamp(name), counter)
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(&format!("{}_", BACKUP_PREFIX))?;
    let raw = rest.get(..15)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
