use zeus_core::catalog::{self, DEFAULT_POSITIONS};
use zeus_core::db::{open_db, open_db_in_memory};
use zeus_core::{
    resolve_hotspots, CalibrationStore, DefaultPositions, IssueLink, IssueStatus, KeyValueStore,
    MemoryKeyValueStore, MutationOutcome, Position, SqliteKeyValueStore, StatusFilter, StoreError,
    CALIBRATIONS_STORAGE_KEY, LOCK_STORAGE_KEY,
};

fn memory_store() -> CalibrationStore<MemoryKeyValueStore> {
    CalibrationStore::load(MemoryKeyValueStore::new())
}

fn builtin_default(id: &str) -> Position {
    DEFAULT_POSITIONS
        .iter()
        .find(|(part_id, _)| *part_id == id)
        .map(|(_, position)| *position)
        .unwrap()
}

#[test]
fn effective_position_falls_back_to_default_then_origin() {
    let mut store = memory_store();

    for part in catalog::list() {
        assert_eq!(store.effective_position(part.id), builtin_default(part.id));
    }
    assert_eq!(store.effective_position("not-a-part"), Position::ORIGIN);

    let moved = Position::new(0.3, -0.1, 0.2);
    store.commit("tail", moved).unwrap();
    assert_eq!(store.effective_position("tail"), moved);
}

#[test]
fn commit_then_read_round_trips_exact_coordinate() {
    let mut store = memory_store();
    let position = Position::new(0.123456789, -0.987654321, 0.5);

    let outcome = store.commit("left-ear", position).unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(store.effective_position("left-ear"), position);

    let reloaded = CalibrationStore::load(store.storage());
    assert_eq!(reloaded.effective_position("left-ear"), position);
}

#[test]
fn clear_restores_pre_commit_default() {
    let mut store = memory_store();
    let before = store.effective_position("chest");

    store.commit("chest", Position::new(0.9, 0.9, 0.9)).unwrap();
    assert!(store.is_calibrated("chest"));

    assert_eq!(store.clear("chest").unwrap(), MutationOutcome::Applied);
    assert!(!store.is_calibrated("chest"));
    assert!(store.calibration("chest").is_none());
    assert_eq!(store.effective_position("chest"), before);
}

#[test]
fn locked_mutations_leave_state_byte_identical() {
    let mut store = memory_store();
    store.commit("nose", Position::new(0.0, 0.0, 0.5)).unwrap();
    store.commit("tail", Position::new(0.0, -0.3, -0.4)).unwrap();
    store.set_locked(true).unwrap();

    let map_before = store.calibrations().clone();
    let raw_before = store.storage().raw(CALIBRATIONS_STORAGE_KEY);

    assert_eq!(
        store.commit("nose", Position::ORIGIN).unwrap(),
        MutationOutcome::IgnoredLocked
    );
    assert_eq!(
        store.commit("abdomen", Position::ORIGIN).unwrap(),
        MutationOutcome::IgnoredLocked
    );
    assert_eq!(
        store.clear("tail").unwrap(),
        MutationOutcome::IgnoredLocked
    );
    assert_eq!(store.clear_all().unwrap(), MutationOutcome::IgnoredLocked);

    assert_eq!(store.calibrations(), &map_before);
    assert_eq!(store.storage().raw(CALIBRATIONS_STORAGE_KEY), raw_before);
}

#[test]
fn toggle_lock_works_in_both_directions() {
    let mut store = memory_store();
    assert!(!store.is_locked());

    assert!(store.toggle_lock().unwrap());
    assert!(store.is_locked());

    assert!(!store.toggle_lock().unwrap());
    assert!(!store.is_locked());

    store.set_locked(true).unwrap();
    store.set_locked(false).unwrap();
    assert!(!store.is_locked());
}

#[test]
fn stats_track_catalog_size_and_rounding() {
    let mut store = memory_store();
    let total = DEFAULT_POSITIONS.len();

    let stats = store.stats();
    assert_eq!(stats.calibrated, 0);
    assert_eq!(stats.total, total);
    assert_eq!(stats.percentage, 0);

    store.commit("nose", Position::ORIGIN).unwrap();
    store.commit("tail", Position::ORIGIN).unwrap();
    let stats = store.stats();
    assert_eq!(stats.calibrated, 2);
    let expected = (100.0 * 2.0 / total as f64).round() as u32;
    assert_eq!(stats.percentage, expected);

    let empty_catalog =
        CalibrationStore::load_with_defaults(MemoryKeyValueStore::new(), DefaultPositions::default());
    assert_eq!(empty_catalog.stats().percentage, 0);
}

#[test]
fn commit_and_clear_all_scenario() {
    let mut store = memory_store();

    store
        .commit("left-eye", Position::new(0.1, 0.2, 0.3))
        .unwrap();
    assert!(store.is_calibrated("left-eye"));
    assert_eq!(
        store.effective_position("left-eye"),
        Position::new(0.1, 0.2, 0.3)
    );

    assert_eq!(store.clear_all().unwrap(), MutationOutcome::Applied);
    assert!(!store.is_calibrated("left-eye"));
    assert_eq!(
        store.effective_position("left-eye"),
        builtin_default("left-eye")
    );
    assert_eq!(
        store.storage().raw(CALIBRATIONS_STORAGE_KEY).as_deref(),
        Some("{}")
    );
}

#[test]
fn persisted_layout_uses_position_array_and_iso_timestamp() {
    let mut store = memory_store();
    store
        .commit("nose", Position::new(0.0, -0.02, 0.42))
        .unwrap();

    let raw = store.storage().raw(CALIBRATIONS_STORAGE_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value["nose"];
    assert_eq!(entry["position"], serde_json::json!([0.0, -0.02, 0.42]));
    let stamp = entry["calibratedAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    assert!(store.storage().raw(LOCK_STORAGE_KEY).is_none());
}

#[test]
fn malformed_storage_falls_back_to_empty_defaults() {
    let storage = MemoryKeyValueStore::new()
        .with_value(CALIBRATIONS_STORAGE_KEY, "{not json")
        .with_value(LOCK_STORAGE_KEY, "\"yes\"");
    let store = CalibrationStore::load(storage);

    assert!(store.calibrations().is_empty());
    assert!(!store.is_locked());
    assert_eq!(store.effective_position("nose"), builtin_default("nose"));
}

#[test]
fn malformed_calibrations_do_not_discard_valid_lock() {
    let storage = MemoryKeyValueStore::new()
        .with_value(CALIBRATIONS_STORAGE_KEY, r#"{"nose":{"position":[1,2]}}"#)
        .with_value(LOCK_STORAGE_KEY, "true");
    let store = CalibrationStore::load(storage);

    assert!(store.calibrations().is_empty());
    assert!(store.is_locked());
}

#[test]
fn persisted_entries_load_on_startup() {
    let storage = MemoryKeyValueStore::new().with_value(
        CALIBRATIONS_STORAGE_KEY,
        r#"{"right-ear":{"position":[-0.25,0.31,0.04],"calibratedAt":"2026-01-08T09:30:00.000Z"}}"#,
    );
    let store = CalibrationStore::load(storage);

    assert!(store.is_calibrated("right-ear"));
    assert_eq!(
        store.effective_position("right-ear"),
        Position::new(-0.25, 0.31, 0.04)
    );
    assert_eq!(
        store.calibration("right-ear").unwrap().calibrated_at,
        "2026-01-08T09:30:00.000Z"
    );
}

#[test]
fn write_failure_is_surfaced_and_not_observable() {
    let mut store = memory_store();
    store.commit("nose", Position::new(0.0, 0.0, 0.4)).unwrap();
    store.storage().set_reject_writes(true);

    let err = store
        .commit("nose", Position::new(0.0, 0.0, 0.9))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persist { .. }));
    assert_eq!(
        store.effective_position("nose"),
        Position::new(0.0, 0.0, 0.4)
    );

    assert!(store.clear_all().is_err());
    assert!(store.is_calibrated("nose"));
}

#[test]
fn independent_stores_do_not_share_lock_state() {
    let mut first = memory_store();
    let mut second = memory_store();

    first.set_locked(true).unwrap();
    assert!(!second.is_locked());

    second.commit("nose", Position::ORIGIN).unwrap();
    assert!(second.is_calibrated("nose"));
    assert!(!first.is_calibrated("nose"));
}

#[test]
fn sqlite_backed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zeus.db");

    {
        let conn = open_db(&path).unwrap();
        let mut store = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
        store
            .commit("back-left-leg", Position::new(0.3, -0.5, -0.3))
            .unwrap();
        store.set_locked(true).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
    assert!(store.is_locked());
    assert_eq!(
        store.effective_position("back-left-leg"),
        Position::new(0.3, -0.5, -0.3)
    );

    let kv = SqliteKeyValueStore::new(&conn);
    assert_eq!(kv.get(LOCK_STORAGE_KEY).unwrap().as_deref(), Some("true"));
}

#[test]
fn sqlite_backed_store_reads_its_own_writes_in_same_session() {
    let conn = open_db_in_memory().unwrap();
    let mut store = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
    store.commit("abdomen", Position::new(0.0, -0.5, 0.1)).unwrap();

    let fresh = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
    assert_eq!(fresh.calibrations(), store.calibrations());
}

#[test]
fn unreadable_storage_loads_defaults_and_still_resolves_hotspots() {
    let storage = MemoryKeyValueStore::new()
        .with_value(
            CALIBRATIONS_STORAGE_KEY,
            r#"{"nose":{"position":[0.0,0.0,0.9],"calibratedAt":"2026-01-08T09:30:00.000Z"}}"#,
        )
        .with_value(LOCK_STORAGE_KEY, "true");
    storage.set_reject_reads(true);
    let store = CalibrationStore::load(storage);

    assert!(store.calibrations().is_empty());
    assert!(!store.is_locked());
    for part in catalog::list() {
        assert_eq!(store.effective_position(part.id), builtin_default(part.id));
    }

    let issues = vec![IssueLink::new("nose-scrape", IssueStatus::Active, Some("nose"))];
    let hotspots = resolve_hotspots(&issues, &store, StatusFilter::ActiveOnly);
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0].position, builtin_default("nose"));
}

#[test]
fn commit_of_unknown_body_part_is_rejected() {
    let mut store = memory_store();

    let err = store.commit("ghost", Position::ORIGIN).unwrap_err();
    assert!(matches!(err, StoreError::UnknownBodyPart(id) if id == "ghost"));
    assert!(!store.is_calibrated("ghost"));
    assert!(store.stats().percentage <= 100);
}
