//! Integration tests for durable store operations.
//!
//! Covers the persistence contract: round-trip fidelity, replace-by-name,
//! creation-order listing, deletion, and degraded-storage behavior.

use std::fs;

use therapy_profiles::error::ProfileError;
use therapy_profiles::profile::{ProfileReference, ProfileStore};

use crate::common::fixtures::{TestStore, multi_segment_profile, valid_profile};

// ===== Round-trip =====

#[test]
fn test_round_trip_preserves_all_schedules() {
    let fixture = TestStore::new();
    let profile = multi_segment_profile("Round Trip");

    let reference = fixture.store.save(&profile).unwrap();
    let loaded = fixture.store.load(&reference).unwrap();

    assert_eq!(loaded, profile);
    assert_eq!(loaded.name, "Round Trip");
    assert_eq!(loaded.basal_rate_schedule.len(), 3);
}

#[test]
fn test_reference_name_matches_record() {
    let fixture = TestStore::new();
    fixture.store.save(&valid_profile("Named")).unwrap();

    let listing = fixture.store.list();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "Named");
}

// ===== Replace-by-name =====

#[test]
fn test_replace_by_name_keeps_exactly_one_record() {
    let fixture = TestStore::new();

    let first = valid_profile("Same Name");
    fixture.store.save(&first).unwrap();

    let mut second = multi_segment_profile("Same Name");
    second.name = "Same Name".to_string();
    let reference = fixture.store.save(&second).unwrap();

    let listing = fixture.store.list();
    let matching: Vec<_> = listing.iter().filter(|r| r.name == "Same Name").collect();
    assert_eq!(matching.len(), 1);

    // The surviving record carries the newest content.
    let loaded = fixture.store.load(&reference).unwrap();
    assert_eq!(loaded, second);
}

#[test]
fn test_distinct_names_do_not_replace() {
    let fixture = TestStore::new();
    fixture.store.save(&valid_profile("One")).unwrap();
    fixture.store.save(&valid_profile("Two")).unwrap();

    assert_eq!(fixture.store.list().len(), 2);
}

// ===== Listing order =====

#[test]
fn test_listing_order_is_save_order() {
    let fixture = TestStore::new();

    // Same-second saves get advanced keys, so order still holds.
    fixture.store.save(&valid_profile("p1")).unwrap();
    fixture.store.save(&valid_profile("p2")).unwrap();
    fixture.store.save(&valid_profile("p3")).unwrap();

    let names: Vec<String> = fixture
        .store
        .list()
        .into_iter()
        .map(|reference| reference.name)
        .collect();
    assert_eq!(names, vec!["p1", "p2", "p3"]);
}

#[test]
fn test_same_second_saves_get_distinct_keys() {
    let fixture = TestStore::new();

    let a = fixture.store.save(&valid_profile("a")).unwrap();
    let b = fixture.store.save(&valid_profile("b")).unwrap();

    assert_ne!(a.storage_key, b.storage_key);
    assert!(b.storage_key > a.storage_key);
}

// ===== Delete =====

#[test]
fn test_delete_removes_exactly_one() {
    let fixture = TestStore::new();

    let kept = fixture.store.save(&valid_profile("Keep")).unwrap();
    let removed = fixture.store.save(&valid_profile("Drop")).unwrap();

    fixture.store.delete(&removed).unwrap();

    let listing = fixture.store.list();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0], kept);

    assert!(matches!(
        fixture.store.load(&removed),
        Err(ProfileError::NotFound { .. })
    ));
}

#[test]
fn test_stale_reference_after_external_delete() {
    let fixture = TestStore::new();
    let reference = fixture.store.save(&valid_profile("Racy")).unwrap();

    // Storage mutated behind the store's back.
    fs::remove_file(
        fixture
            .dir
            .path()
            .join(format!("{}.profile.json", reference.storage_key)),
    )
    .unwrap();

    assert!(matches!(
        fixture.store.load(&reference),
        Err(ProfileError::NotFound { .. })
    ));
    assert!(matches!(
        fixture.store.delete(&reference),
        Err(ProfileError::NotFound { .. })
    ));
}

// ===== Degraded storage =====

#[test]
fn test_corrupt_record_skipped_by_list_but_fatal_to_load() {
    let fixture = TestStore::new();
    fixture.store.save(&valid_profile("Intact")).unwrap();

    let corrupt_key = "2020-01-01-00-00-00";
    fs::write(
        fixture
            .dir
            .path()
            .join(format!("{corrupt_key}.profile.json")),
        b"{ not json",
    )
    .unwrap();

    let listing = fixture.store.list();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "Intact");

    let reference = ProfileReference::new("Broken".to_string(), corrupt_key.to_string());
    assert!(matches!(
        fixture.store.load(&reference),
        Err(ProfileError::CorruptRecord { .. })
    ));
}

#[test]
fn test_storage_path_occupied_by_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let occupied = temp.path().join("profiles");
    fs::write(&occupied, b"in the way").unwrap();

    let store = ProfileStore::new(&occupied);
    assert!(matches!(
        store.ensure_storage_ready(),
        Err(ProfileError::StorageUnavailable { .. })
    ));
    assert!(matches!(
        store.save(&valid_profile("Blocked")),
        Err(ProfileError::StorageUnavailable { .. })
    ));
}

#[test]
fn test_record_files_are_human_diagnosable() {
    let fixture = TestStore::new();
    let reference = fixture.store.save(&valid_profile("Readable")).unwrap();

    // yyyy-MM-dd-HH-mm-ss stem plus the format-identifying extension.
    let file = fixture
        .dir
        .path()
        .join(format!("{}.profile.json", reference.storage_key));
    assert!(file.exists());

    let stem = &reference.storage_key;
    assert_eq!(stem.len(), "2024-01-01-00-00-00".len());
    assert!(stem.chars().all(|c| c.is_ascii_digit() || c == '-'));

    let contents = fs::read_to_string(&file).unwrap();
    assert!(contents.contains("\"name\": \"Readable\""));
}
