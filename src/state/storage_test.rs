use super::*;
use time::macros::datetime;

fn entry(value: &str, expires_at: OffsetDateTime) -> StoredEntry {
    StoredEntry { value: value.to_owned(), expires_at }
}

/// Scratch directory (deleted on drop) and a session file path inside it.
fn scratch_file() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    (dir, path)
}

// =============================================================================
// StoredEntry
// =============================================================================

#[test]
fn entry_expires_at_boundary() {
    let e = entry("t", datetime!(2025-01-04 00:00 UTC));
    assert!(e.is_live(datetime!(2025-01-03 23:59:59 UTC)));
    assert!(!e.is_live(datetime!(2025-01-04 00:00 UTC)));
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_store_load_remove() {
    let storage = MemoryStorage::new();
    assert!(storage.is_empty());

    storage.store("token", entry("abc", datetime!(2030-01-01 00:00 UTC))).unwrap();
    assert_eq!(storage.load("token").unwrap().unwrap().value, "abc");
    assert_eq!(storage.len(), 1);

    storage.remove("token").unwrap();
    assert!(storage.load("token").unwrap().is_none());
}

#[test]
fn get_live_hides_expired_entries() {
    let storage = MemoryStorage::new();
    storage.store("token", entry("abc", datetime!(2025-01-04 00:00 UTC))).unwrap();

    let before = storage.get_live("token", datetime!(2025-01-02 00:00 UTC)).unwrap();
    assert_eq!(before.as_deref(), Some("abc"));
    let after = storage.get_live("token", datetime!(2025-01-05 00:00 UTC)).unwrap();
    assert_eq!(after, None);
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_storage_missing_file_reads_empty() {
    let (_dir, path) = scratch_file();
    let storage = FileStorage::new(path);
    assert!(storage.load("token").unwrap().is_none());
}

#[test]
fn file_storage_persists_across_instances() {
    let (_dir, path) = scratch_file();

    let first = FileStorage::new(&path);
    first.store("token", entry("abc", datetime!(2030-01-01 00:00 UTC))).unwrap();
    first.store("user", entry("{}", datetime!(2030-01-01 00:00 UTC))).unwrap();

    let second = FileStorage::new(&path);
    assert_eq!(second.load("token").unwrap().unwrap().value, "abc");
    second.remove("token").unwrap();

    let third = FileStorage::new(&path);
    assert!(third.load("token").unwrap().is_none());
    assert!(third.load("user").unwrap().is_some());
    assert_eq!(third.path(), path.as_path());
}

#[test]
fn file_storage_corrupt_document_errors() {
    let (_dir, path) = scratch_file();
    fs::write(&path, "not json").unwrap();

    let storage = FileStorage::new(&path);
    assert!(matches!(storage.load("token"), Err(StorageError::Corrupt(_))));
}

// =============================================================================
// ManualClock
// =============================================================================

#[test]
fn manual_clock_advances() {
    let clock = ManualClock::new(datetime!(2025-01-01 00:00 UTC));
    clock.advance(time::Duration::days(3));
    assert_eq!(clock.now(), datetime!(2025-01-04 00:00 UTC));
}
