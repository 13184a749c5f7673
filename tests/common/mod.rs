#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use brokedash::{
    config::ConfigManager,
    core::LeaderboardService,
    domain::RankingPolicy,
    storage::{JsonProfileStorage, StoragePaths},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated storage, service and config manager rooted in a unique directory.
pub fn setup_test_env(
    policy: RankingPolicy,
) -> (Arc<JsonProfileStorage>, LeaderboardService, ConfigManager) {
    let base = temp_home();
    let storage = Arc::new(
        JsonProfileStorage::with_retention(StoragePaths::under(&base.join("data")), 3)
            .expect("create json storage backend"),
    );
    let service = LeaderboardService::new(storage.clone(), policy);
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (storage, service, config_manager)
}
