//! Reads, writes and snapshots the brokedash [`Config`].
//!
//! The live file is `<base>/config/config.json`. Snapshots sit next to it in
//! `backups/` as `config_YYYYMMDD_HHMM[_note].json` and are listed newest
//! first.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_SUFFIX: &str = ".json";
const BACKUP_STAMP: &str = "%Y%m%d_%H%M";
const BACKUP_STAMP_LEN: usize = 13;

/// One saved configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub name: String,
    /// `None` when the file name carries no readable stamp.
    pub created_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl ConfigBackup {
    /// Parses a snapshot file name, rejecting anything that could leave the backups directory.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        let stem = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(BACKUP_SUFFIX)?;
        let created_at = stem
            .get(..BACKUP_STAMP_LEN)
            .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP).ok())
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
        let note = stem
            .get(BACKUP_STAMP_LEN..)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|note| !note.is_empty())
            .map(str::to_string);
        Some(Self {
            name: name.to_string(),
            created_at,
            note,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/` and its `backups/` directory.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Loads the live config; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(data) => parse_config(&data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        replace_file(&self.config_path, &render_config(config)?)
    }

    /// Writes a snapshot of `config` and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let mut name = format!(
            "{}{}",
            BACKUP_PREFIX,
            Utc::now().format(BACKUP_STAMP)
        );
        if let Some(note) = note.and_then(slug) {
            name.push('_');
            name.push_str(&note);
        }
        name.push_str(BACKUP_SUFFIX);
        replace_file(&self.backups_dir.join(&name), &render_config(config)?)?;
        Ok(name)
    }

    /// Makes the named snapshot the live config and returns it.
    pub fn restore(&self, name: &str) -> Result<Config, ConfigError> {
        let missing = || ConfigError::BackupNotFound(name.to_string());
        let backup = ConfigBackup::from_name(name).ok_or_else(missing)?;
        let data = match fs::read_to_string(self.backups_dir.join(&backup.name)) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(missing()),
            Err(err) => return Err(err.into()),
        };
        let config = parse_config(&data)?;
        self.save(&config)?;
        Ok(config)
    }

    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>, ConfigError> {
        let entries = match fs::read_dir(&self.backups_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut backups = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            if let Some(backup) = name.to_str().and_then(ConfigBackup::from_name) {
                backups.push(backup);
            }
        }
        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }
}

fn parse_config(data: &str) -> Result<Config, ConfigError> {
    let config: Config =
        serde_json::from_str(data).map_err(|err| ConfigError::Serde(err.to_string()))?;
    config.validate()?;
    Ok(config)
}

fn render_config(config: &Config) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))
}

/// Lowercase words joined by single dashes; `None` when nothing usable is left.
fn slug(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

/// Writes `data` beside `path` and renames it into place.
fn replace_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
