use std::fs;

use brokedash_config::{Config, ConfigError, ConfigManager};
use brokedash_domain::{RankingPolicy, RecomputeStrategy};
use tempfile::tempdir;

#[test]
fn default_config_uses_dense_global_ranking() {
    let cfg = Config::default();

    assert_eq!(cfg.ranking_policy, RankingPolicy::Dense);
    assert_eq!(cfg.recompute_strategy, RecomputeStrategy::Global);
    assert_eq!(cfg.currency, "USD");
    assert_eq!(cfg.backup_retention, 5);
    assert!(cfg.ui_color_enabled);
    assert!(cfg.data_root.is_none());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.ranking_policy = RankingPolicy::Strict;
    cfg.recompute_strategy = RecomputeStrategy::Manual;
    cfg.backup_retention = 2;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn missing_config_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert!(manager.backups_dir().exists());
}

#[test]
fn partial_config_fills_missing_fields() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));
    fs::write(manager.config_path(), r#"{ "ranking_policy": "strict" }"#).unwrap();

    let loaded = manager.load().expect("load");

    assert_eq!(loaded.ranking_policy, RankingPolicy::Strict);
    assert_eq!(loaded.recompute_strategy, RecomputeStrategy::Global);
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn corrupt_config_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));
    fs::write(manager.config_path(), "{ broken").unwrap();

    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}

#[test]
fn unknown_policy_or_bad_values_are_rejected_on_load() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    fs::write(manager.config_path(), r#"{ "ranking_policy": "olympic" }"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));

    fs::write(manager.config_path(), r#"{ "recompute_strategy": "nightly" }"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));

    fs::write(manager.config_path(), r#"{ "backup_retention": 0 }"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));

    let mut cfg = Config::default();
    cfg.currency = "  ".into();
    assert!(matches!(manager.save(&cfg), Err(ConfigError::Invalid(_))));
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut original = Config::default();
    original.currency = "EUR".into();
    let name = manager
        .backup(&original, Some("Before strict"))
        .expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-strict.json"));

    let mut changed = original.clone();
    changed.currency = "GBP".into();
    manager.save(&changed).unwrap();

    let backups = manager.list_backups().expect("list");
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].name, name);
    assert_eq!(backups[0].note.as_deref(), Some("before-strict"));
    assert!(backups[0].created_at.is_some());

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.currency, "EUR");
    assert_eq!(manager.load().unwrap().currency, "EUR");

    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}

#[test]
fn restore_refuses_names_outside_the_backups_directory() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    let mut live = Config::default();
    live.currency = "EUR".into();
    manager.save(&live).unwrap();

    let mut outside = Config::default();
    outside.currency = "JPY".into();
    fs::write(
        dir.path().join("config").join("config_outside.json"),
        serde_json::to_string(&outside).unwrap(),
    )
    .unwrap();

    assert!(matches!(
        manager.restore("../config_outside.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
    assert!(matches!(
        manager.restore("../config.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
    assert_eq!(manager.load().unwrap().currency, "EUR");
}

#[test]
fn data_root_prefers_explicit_then_base() {
    let dir = tempdir().expect("tempdir");
    let base = dir.path();
    let mut cfg = Config::default();

    assert_eq!(cfg.resolve_data_root(Some(base)), base.join("data"));

    cfg.data_root = Some(dir.path().join("custom"));
    assert_eq!(cfg.resolve_data_root(Some(base)), dir.path().join("custom"));
}
