use porssisahko::PorssisahkoError;
use porssisahko::persistence::{ConfigEntry, ENTRY_VERSION, EntryOptions, EntryStore};

fn entry_path(dir: &tempfile::TempDir) -> String {
    dir.path().join("entry.json").to_string_lossy().to_string()
}

#[test]
fn missing_file_means_not_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = EntryStore::new(&entry_path(&dir));
    assert!(store.load().unwrap().is_none());
    assert!(store.entry().is_none());
}

#[test]
fn create_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);

    let mut store = EntryStore::new(&path);
    let created = store
        .create_entry("Porssisahko Price", EntryOptions { transfer_fee: 0.03 })
        .unwrap()
        .clone();
    assert_eq!(created.version, ENTRY_VERSION);
    assert!(created.options.is_none());

    let mut reloaded = EntryStore::new(&path);
    let loaded = reloaded.load().unwrap().unwrap();
    assert_eq!(loaded, &created);
    assert!((loaded.transfer_fee() - 0.03).abs() < 1e-12);
}

#[test]
fn second_entry_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = EntryStore::new(&entry_path(&dir));
    store
        .create_entry("a", EntryOptions::default())
        .unwrap();
    let err = store
        .create_entry("b", EntryOptions::default())
        .unwrap_err();
    assert!(matches!(err, PorssisahkoError::AlreadyConfigured));
}

#[test]
fn update_options_persists_and_wins_over_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);

    let mut store = EntryStore::new(&path);
    store
        .create_entry("t", EntryOptions { transfer_fee: 0.01 })
        .unwrap();
    store
        .update_options(EntryOptions { transfer_fee: 0.06 })
        .unwrap();

    let mut reloaded = EntryStore::new(&path);
    let entry = reloaded.load().unwrap().unwrap();
    assert!((entry.data.transfer_fee - 0.01).abs() < 1e-12);
    assert!((entry.transfer_fee() - 0.06).abs() < 1e-12);
}

#[test]
fn update_without_entry_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = EntryStore::new(&entry_path(&dir));
    let err = store.update_options(EntryOptions::default()).unwrap_err();
    assert!(matches!(err, PorssisahkoError::Config { .. }));
}

#[test]
fn load_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);

    let first = EntryStore::new(&path)
        .load_or_create("t", EntryOptions { transfer_fee: 0.02 })
        .unwrap();
    let second = EntryStore::new(&path)
        .load_or_create("t", EntryOptions { transfer_fee: 0.09 })
        .unwrap();
    assert_eq!(first.entry_id, second.entry_id);
    assert!((second.transfer_fee() - 0.02).abs() < 1e-12);
}

#[test]
fn newer_entry_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);
    let mut entry = ConfigEntry::new("t", EntryOptions::default());
    entry.version = ENTRY_VERSION + 1;
    std::fs::write(&path, serde_json::to_string(&entry).unwrap()).unwrap();

    let err = EntryStore::new(&path).load().unwrap_err();
    assert!(matches!(err, PorssisahkoError::Config { .. }));
}

#[test]
fn corrupt_file_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);
    std::fs::write(&path, "{not json").unwrap();
    let err = EntryStore::new(&path).load().unwrap_err();
    assert!(matches!(err, PorssisahkoError::Serialization { .. }));
}

#[test]
fn failed_create_leaves_store_unconfigured() {
    let dir = tempfile::tempdir().unwrap();
    // Parent of the entry path is a regular file, so the write cannot succeed
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let path = blocker.join("entry.json").to_string_lossy().to_string();

    let mut store = EntryStore::new(&path);
    let err = store
        .create_entry("t", EntryOptions { transfer_fee: 0.02 })
        .unwrap_err();
    assert!(matches!(err, PorssisahkoError::Io { .. }));
    assert!(store.entry().is_none());

    // A retry is not mistaken for a second instance
    let err = store
        .create_entry("t", EntryOptions { transfer_fee: 0.02 })
        .unwrap_err();
    assert!(matches!(err, PorssisahkoError::Io { .. }));
}

#[test]
fn failed_options_write_keeps_previous_fee() {
    let dir = tempfile::tempdir().unwrap();
    let path = entry_path(&dir);

    let mut store = EntryStore::new(&path);
    store
        .create_entry("t", EntryOptions { transfer_fee: 0.01 })
        .unwrap();

    // Replace the file with a directory so the next write fails
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let err = store
        .update_options(EntryOptions { transfer_fee: 0.9 })
        .unwrap_err();
    assert!(matches!(err, PorssisahkoError::Io { .. }));
    let entry = store.entry().unwrap();
    assert!(entry.options.is_none());
    assert!((entry.transfer_fee() - 0.01).abs() < 1e-12);
}
