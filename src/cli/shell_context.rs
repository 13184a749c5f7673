use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use brokedash_config::{Config, ConfigManager};
use brokedash_core::{LeaderboardService, RecomputeStrategy};
use brokedash_domain::RankingPolicy;
use brokedash_storage_json::{JsonProfileStorage, StoragePaths};
use tracing::debug;

use crate::errors::CliError;
use crate::utils;

use super::{commands, output, registry::CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach: configuration, storage and the
/// leaderboard service built on top of them.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub base_dir: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub storage: Arc<JsonProfileStorage>,
    pub service: LeaderboardService,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, utils::app_base_dir())
    }

    pub fn with_base_dir(mode: CliMode, base_dir: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = config_manager.load()?;
        output::apply_config(&config);

        let storage = open_storage(&config, &base_dir)?;
        let service = LeaderboardService::new(storage.clone(), config.ranking_policy);
        debug!(base = %base_dir.display(), "shell context ready");

        Ok(Self {
            mode,
            registry,
            base_dir,
            config_manager,
            config,
            storage,
            service,
            last_command: None,
            running: true,
        })
    }

    pub fn policy(&self) -> RankingPolicy {
        self.config.ranking_policy
    }

    pub fn strategy(&self) -> RecomputeStrategy {
        self.config.recompute_strategy
    }

    pub fn data_root(&self) -> PathBuf {
        self.config.resolve_data_root(Some(self.base_dir.as_path()))
    }

    /// Rebuilds storage and service after a configuration change.
    pub fn reload_services(&mut self) -> Result<(), CliError> {
        self.storage = open_storage(&self.config, &self.base_dir)?;
        self.service = LeaderboardService::new(self.storage.clone(), self.policy());
        output::apply_config(&self.config);
        Ok(())
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        format!("brokedash [{}]> ", self.policy())
    }
}

fn open_storage(config: &Config, base_dir: &Path) -> Result<Arc<JsonProfileStorage>, CliError> {
    let root = config.resolve_data_root(Some(base_dir));
    let storage = JsonProfileStorage::with_retention(
        StoragePaths::under(&root),
        config.backup_retention,
    )?;
    Ok(Arc::new(storage))
}
