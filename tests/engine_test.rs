//! Integration tests for a full rotation run over the data directory

mod common;

use common::{create_catalog, site_url, write_catalog, write_statuses, FakeProber};
use iroiro::liveness::ProbePolicy;
use iroiro::models::{SiteStatus, StatusRecord};
use iroiro::rotation::{RandomIndex, RotationEngine, RunMode, ScriptedIndex, Selection, Selector};
use iroiro::storage::DataStore;
use iroiro::utils::error::StoreError;
use std::collections::HashSet;
use tempfile::TempDir;

fn engine(dir: &TempDir, prober: FakeProber) -> RotationEngine<FakeProber> {
    RotationEngine::new(
        DataStore::new(dir.path()),
        Selector::new(prober, ProbePolicy::new()),
        5,
    )
}

fn all_reachable(n: usize) -> FakeProber {
    let urls: Vec<String> = (0..n).map(site_url).collect();
    let answers: Vec<(&str, bool)> = urls.iter().map(|u| (u.as_str(), true)).collect();
    FakeProber::new(&answers)
}

#[tokio::test]
async fn test_automatic_run_persists_rotation() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(1));

    let outcome = engine(&dir, all_reachable(1))
        .run(&RunMode::Automatic, &mut ScriptedIndex::new([0]))
        .await
        .unwrap();

    assert_eq!(outcome.report.selected_key(), Some("0"));
    assert_eq!(outcome.entry.unwrap().url, site_url(0));

    let store = DataStore::new(dir.path());
    assert_eq!(store.load_rotation().unwrap().keys(), ["0"]);
    // first touch creates the record and persists it
    assert!(outcome.report.status_changed);
    assert_eq!(store.load_statuses().unwrap()["0"], StatusRecord::default());

    let outcome = engine(&dir, all_reachable(1))
        .run(&RunMode::Automatic, &mut ScriptedIndex::new([0]))
        .await
        .unwrap();
    assert_eq!(outcome.report.selected_key(), Some("0"));
    assert!(!outcome.report.status_changed);
}

#[tokio::test]
async fn test_deleted_key_is_pruned_from_rotation() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(2));
    std::fs::write(dir.path().join("rotation.json"), r#"["7","0"]"#).unwrap();

    let outcome = engine(&dir, all_reachable(2))
        .run(&RunMode::Automatic, &mut ScriptedIndex::new([0]))
        .await
        .unwrap();

    assert_eq!(outcome.report.selected_key(), Some("1"));
    let rotation = DataStore::new(dir.path()).load_rotation().unwrap();
    assert_eq!(rotation.keys(), ["0", "1"]);
}

#[tokio::test]
async fn test_status_file_untouched_when_nothing_changed() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(1));
    let compact = r#"{"0":{"status":"active","failureCount":0}}"#;
    std::fs::write(dir.path().join("status.json"), compact).unwrap();

    let outcome = engine(&dir, all_reachable(1))
        .run(&RunMode::Automatic, &mut ScriptedIndex::new([0]))
        .await
        .unwrap();

    assert!(!outcome.report.status_changed);
    let on_disk = std::fs::read_to_string(dir.path().join("status.json")).unwrap();
    assert_eq!(on_disk, compact);
}

#[tokio::test]
async fn test_status_file_format() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(1));

    engine(&dir, FakeProber::default())
        .run(&RunMode::Automatic, &mut ScriptedIndex::new([0]))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("status.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["0"]["status"], "active");
    assert_eq!(value["0"]["failureCount"], 1);
}

#[tokio::test]
async fn test_manual_run_never_writes_rotation() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(2));

    let outcome = engine(&dir, all_reachable(2))
        .run(&RunMode::Manual("1".into()), &mut ScriptedIndex::default())
        .await
        .unwrap();

    assert_eq!(outcome.report.selected_key(), Some("1"));
    assert!(!dir.path().join("rotation.json").exists());
}

#[tokio::test]
async fn test_manual_not_found_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(2));

    let outcome = engine(&dir, all_reachable(2))
        .run(&RunMode::Manual("42".into()), &mut ScriptedIndex::default())
        .await
        .unwrap();

    assert_eq!(outcome.report.selection, Selection::NotFound("42".into()));
    assert!(outcome.report.should_exit());
    assert!(outcome.entry.is_none());
    assert!(!dir.path().join("status.json").exists());
    assert!(!dir.path().join("rotation.json").exists());
}

#[tokio::test]
async fn test_manual_unreachable_records_failure() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(2));
    let before = StatusRecord {
        status: SiteStatus::Active,
        failure_count: 2,
    };
    write_statuses(dir.path(), &[("1", before)]);

    let outcome = engine(&dir, FakeProber::default())
        .run(&RunMode::Manual("1".into()), &mut ScriptedIndex::default())
        .await
        .unwrap();

    assert_eq!(outcome.report.selection, Selection::Unreachable("1".into()));
    assert_eq!(outcome.entry.map(|e| e.url), Some(site_url(1)));

    assert!(outcome.report.status_changed);
    let statuses = DataStore::new(dir.path()).load_statuses().unwrap();
    assert_eq!(statuses["1"].status, SiteStatus::Active);
    assert_eq!(statuses["1"].failure_count, 3);
}

#[tokio::test]
async fn test_all_inactive_is_benign() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(2));
    write_statuses(
        dir.path(),
        &[
            ("0", StatusRecord::inactive(5)),
            ("1", StatusRecord::inactive(5)),
        ],
    );

    let prober = all_reachable(2);
    let engine = engine(&dir, prober);
    let outcome = engine
        .run(&RunMode::Automatic, &mut RandomIndex::seeded(7))
        .await
        .unwrap();

    assert_eq!(outcome.report.selection, Selection::Nothing);
    assert!(!outcome.report.should_exit());
    assert!(engine.selector().prober().calls().is_empty());
    assert!(!dir.path().join("rotation.json").exists());
}

#[tokio::test]
async fn test_missing_catalog_is_an_error() {
    let dir = TempDir::new().unwrap();

    let result = engine(&dir, all_reachable(1))
        .run(&RunMode::Automatic, &mut ScriptedIndex::default())
        .await;

    assert!(matches!(result, Err(StoreError::Read { .. })));
    assert!(!dir.path().join("status.json").exists());
}

#[tokio::test]
async fn test_malformed_status_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(1));
    std::fs::write(dir.path().join("status.json"), "{ not json").unwrap();

    let result = engine(&dir, all_reachable(1))
        .run(&RunMode::Automatic, &mut ScriptedIndex::default())
        .await;

    assert!(matches!(result, Err(StoreError::Malformed { .. })));
}

#[tokio::test]
async fn test_full_cycle_then_reset() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(3));
    let engine = engine(&dir, all_reachable(3));
    let mut draws = RandomIndex::seeded(42);

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let outcome = engine.run(&RunMode::Automatic, &mut draws).await.unwrap();
        let key = outcome.report.selected_key().unwrap().to_string();
        assert!(seen.insert(key), "no key repeats within a cycle");
    }
    assert_eq!(seen.len(), 3);

    let store = DataStore::new(dir.path());
    assert_eq!(store.load_rotation().unwrap().len(), 3);

    let outcome = engine.run(&RunMode::Automatic, &mut draws).await.unwrap();
    assert!(outcome.report.log_changed);
    assert!(outcome.report.selected_key().is_some());
    assert_eq!(store.load_rotation().unwrap().len(), 1);
}

#[tokio::test]
async fn test_repeated_failures_mark_inactive() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path(), &create_catalog(1));
    let engine = engine(&dir, FakeProber::default());

    for _ in 0..5 {
        let outcome = engine
            .run(&RunMode::Automatic, &mut ScriptedIndex::default())
            .await
            .unwrap();
        assert_eq!(outcome.report.selection, Selection::Nothing);
    }

    let statuses = DataStore::new(dir.path()).load_statuses().unwrap();
    assert_eq!(statuses["0"].status, SiteStatus::Inactive);
    assert_eq!(statuses["0"].failure_count, 5);

    // inactive now, so no further probes
    let outcome = engine
        .run(&RunMode::Automatic, &mut ScriptedIndex::default())
        .await
        .unwrap();
    assert_eq!(outcome.report.attempts, 0);
    assert_eq!(engine.selector().prober().calls().len(), 5);
}
