use std::{fs, sync::Arc};

use brokedash_core::{
    storage::ProfileStorage, LeaderboardService, ProfileService, RankingEngine, SystemClock,
};
use brokedash_domain::{IncomeBracket, RankingPolicy, UserProfile};
use brokedash_storage_json::{JsonProfileStorage, StoragePaths};
use tempfile::tempdir;

#[test]
fn json_storage_saves_and_reloads_profiles() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonProfileStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    let profile = UserProfile::new(IncomeBracket::From150kTo250k, 640.0);
    storage.save_profile(&profile).expect("save profile");

    let reopened = JsonProfileStorage::new(StoragePaths::under(dir.path())).expect("reopen");
    let loaded = reopened
        .get_profile(profile.id)
        .expect("load profile")
        .expect("profile exists");

    assert_eq!(loaded, profile);
    assert!(reopened.profiles_path().exists());
    assert!(!reopened.profiles_path().with_extension("json.tmp").exists());
}

#[test]
fn json_storage_starts_empty() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonProfileStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    assert!(storage.list_profiles().unwrap().is_empty());
    assert!(storage.list_ranked_entries().unwrap().is_empty());
    assert!(storage.list_backups().unwrap().is_empty());
}

#[test]
fn json_storage_upserts_entries_by_id() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonProfileStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let profiles = vec![
        UserProfile::new(IncomeBracket::Under100k, 900.0),
        UserProfile::new(IncomeBracket::Over250k, 900.0),
    ];
    let mut entries = RankingEngine::rank(&profiles, RankingPolicy::Dense);
    storage.upsert_ranked_entries(&entries).expect("upsert");

    entries[1].rank = 7;
    storage
        .upsert_ranked_entries(&entries[1..])
        .expect("upsert single");

    let stored = storage.list_ranked_entries().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].rank, 7);
}

#[test]
fn json_storage_backs_up_previous_leaderboard_on_replace() {
    let dir = tempdir().expect("tempdir");
    let storage = Arc::new(
        JsonProfileStorage::with_retention(StoragePaths::under(dir.path()), 2)
            .expect("create storage"),
    );
    let service = LeaderboardService::new(storage.clone(), RankingPolicy::Dense);
    ProfileService::submit(storage.as_ref(), &SystemClock, None, IncomeBracket::Under100k, 250.0).unwrap();

    service.recompute_global_ranking().unwrap();
    assert!(storage.list_backups().unwrap().is_empty());

    for _ in 0..4 {
        service.recompute_global_ranking().unwrap();
    }

    let backups = storage.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|backup| backup.size_bytes > 0));
    assert!(backups.iter().all(|backup| backup.created_at.is_some()));
}

#[test]
fn json_storage_recompute_survives_an_unremovable_backup() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    // a directory can't be removed with remove_file, so pruning it fails
    let stuck = paths.backup_root.join("brokerank_20000101_000000.json");
    fs::create_dir_all(&stuck).unwrap();
    let storage = Arc::new(JsonProfileStorage::with_retention(paths, 1).expect("create storage"));
    let service = LeaderboardService::new(storage.clone(), RankingPolicy::Dense);
    ProfileService::submit(storage.as_ref(), &SystemClock, None, IncomeBracket::Under100k, 250.0).unwrap();

    service.recompute_global_ranking().unwrap();
    service.recompute_global_ranking().expect("prune failure is not fatal");

    assert!(stuck.is_dir());
    assert_eq!(storage.list_ranked_entries().unwrap().len(), 1);
    let backups = storage.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert!(backups[0].path.is_file());
}

#[test]
fn json_storage_restores_backup() {
    let dir = tempdir().expect("tempdir");
    let storage = Arc::new(JsonProfileStorage::new(StoragePaths::under(dir.path())).unwrap());
    let service = LeaderboardService::new(storage.clone(), RankingPolicy::Dense);
    let first = ProfileService::submit(storage.as_ref(), &SystemClock, None, IncomeBracket::Under100k, 250.0)
        .unwrap();
    service.recompute_global_ranking().unwrap();

    ProfileService::submit(storage.as_ref(), &SystemClock, None, IncomeBracket::Under100k, 2500.0).unwrap();
    service.recompute_global_ranking().unwrap();
    assert_eq!(storage.list_ranked_entries().unwrap().len(), 2);

    let backup = storage.list_backups().unwrap().remove(0);
    let restored = storage.restore_backup(&backup.id).expect("restore");

    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id, first.id);
    assert_eq!(storage.list_ranked_entries().unwrap(), restored);
    assert!(storage.restore_backup("brokerank_missing.json").is_err());

    // the two-entry snapshot that was live before the restore is kept as a backup
    let newest = storage.list_backups().unwrap().remove(0);
    assert_eq!(storage.restore_backup(&newest.id).unwrap().len(), 2);
}

#[test]
fn json_storage_restore_rejects_paths_outside_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = Arc::new(JsonProfileStorage::new(StoragePaths::under(dir.path())).unwrap());
    let service = LeaderboardService::new(storage.clone(), RankingPolicy::Dense);
    ProfileService::submit(storage.as_ref(), &SystemClock, None, IncomeBracket::Over250k, 90.0)
        .unwrap();
    service.recompute_global_ranking().unwrap();
    fs::write(dir.path().join("outside.json"), "[]").unwrap();
    fs::write(dir.path().join("brokerank_outside.json"), "[]").unwrap();

    assert!(storage.restore_backup("../outside.json").is_err());
    assert!(storage.restore_backup("../brokerank_outside.json").is_err());
    assert!(storage.restore_backup("../brokerank.json").is_err());

    assert_eq!(storage.list_ranked_entries().unwrap().len(), 1);
    assert!(storage.list_backups().unwrap().is_empty());
}

#[test]
fn json_storage_reports_corrupt_files() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonProfileStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    fs::write(storage.profiles_path(), "{ not json").unwrap();

    assert!(storage.list_profiles().is_err());
}
