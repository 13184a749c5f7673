use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use brokedash_domain::{RankingPolicy, RecomputeStrategy};

use crate::ConfigError;

/// Stores ranking preferences, output settings and storage locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ranking_policy: RankingPolicy,
    #[serde(default)]
    pub recompute_strategy: RecomputeStrategy,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_profile_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for profile and leaderboard data.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ranking_policy: RankingPolicy::default(),
            recompute_strategy: RecomputeStrategy::default(),
            currency: Self::default_currency(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            output: OutputSettings::default(),
            backup_retention: Self::default_backup_retention(),
            last_profile_id: None,
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// Rejects values that deserialize but cannot drive the leaderboard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup_retention == 0 {
            return Err(ConfigError::Invalid(
                "backup_retention must keep at least one snapshot".into(),
            ));
        }
        let currency = self.currency.trim();
        if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "currency `{}` is not a currency code",
                self.currency
            )));
        }
        Ok(())
    }

    /// Resolves the data directory, relative to `base` when one is supplied.
    pub fn resolve_data_root(&self, base: Option<&Path>) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        if let Some(base) = base {
            return base.join("data");
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("brokedash")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputSettings {
    #[serde(default)]
    pub plain_output: bool,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default)]
    pub quiet: bool,
}
