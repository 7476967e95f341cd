use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use pocketlink::errors::{PocketlinkError, Result};
use pocketlink::logging::EventLog;
use pocketlink::services::{ClickRecorder, DEFAULT_LOCATION, DEFAULT_SOURCE};
use pocketlink::storage::{CLICKS_KEY, FileStore, MemoryStore, RecordStore};
use pocketlink::utils::ManualClock;
use tempfile::TempDir;

struct ReadOnlyStore(MemoryStore);

impl RecordStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &serde_json::Value) -> Result<()> {
        Err(PocketlinkError::file_operation("read-only"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(PocketlinkError::file_operation("read-only"))
    }

    fn update(
        &self,
        _key: &str,
        _apply: &mut dyn FnMut(Option<serde_json::Value>) -> Result<serde_json::Value>,
    ) -> Result<()> {
        Err(PocketlinkError::file_operation("read-only"))
    }

    fn backend_name(&self) -> &'static str {
        "read-only"
    }
}

fn recorder() -> ClickRecorder {
    ClickRecorder::new(Arc::new(MemoryStore::new()), EventLog::discard())
}

#[test]
fn test_click_on_nonexistent_code_is_appended() {
    let clicks = recorder();

    clicks
        .record_click("nonexistent-code", DEFAULT_SOURCE, DEFAULT_LOCATION)
        .unwrap();

    let log = clicks.get_clicks();
    assert_eq!(log["nonexistent-code"].len(), 1);
    assert_eq!(log["nonexistent-code"][0].source, "direct");
    assert_eq!(log["nonexistent-code"][0].location, "Unknown");
}

#[test]
fn test_clicks_keep_insertion_order() {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(t0));
    let clicks = ClickRecorder::new(Arc::new(MemoryStore::new()), EventLog::discard())
        .with_clock(clock.clone());

    let first = clicks.record_click("abcd", "twitter", "Berlin").unwrap();
    clock.advance(Duration::seconds(5));
    let second = clicks.record_direct_click("abcd").unwrap();
    clicks.record_direct_click("wxyz").unwrap();

    let events = clicks.clicks_for("abcd");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, first);
    assert_eq!(events[0].timestamp, t0);
    assert_eq!(events[0].source, "twitter");
    assert_eq!(events[1].id, second);
    assert_eq!(events[1].timestamp, t0 + Duration::seconds(5));

    assert_eq!(clicks.click_count("abcd"), 2);
    assert_eq!(clicks.click_count("wxyz"), 1);
    assert_eq!(clicks.click_count("none"), 0);
    assert!(clicks.clicks_for("none").is_empty());
}

#[test]
fn test_click_ids_are_unique() {
    let clicks = recorder();
    let a = clicks.record_direct_click("abcd").unwrap();
    let b = clicks.record_direct_click("abcd").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_write_failure_is_reported() {
    let clicks = ClickRecorder::new(
        Arc::new(ReadOnlyStore(MemoryStore::new())),
        EventLog::discard(),
    );

    let err = clicks.record_direct_click("abcd").unwrap_err();
    assert!(matches!(err, PocketlinkError::StoreFailure(_)));
    assert!(clicks.get_clicks().is_empty());
}

#[test]
fn test_corrupt_click_log_degrades_to_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(CLICKS_KEY, &json!("garbage")).unwrap();
    let clicks = ClickRecorder::new(store, EventLog::discard());

    assert!(clicks.get_clicks().is_empty());
    // 无法读取时不覆盖已有数据
    assert!(matches!(
        clicks.record_direct_click("abcd"),
        Err(PocketlinkError::StoreFailure(_))
    ));
}

#[test]
fn test_reads_legacy_unversioned_click_map() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(
            CLICKS_KEY,
            &json!({
                "abcd": [{
                    "id": "1700000000000",
                    "timestamp": "2024-01-01T00:00:00.000Z",
                    "source": "direct",
                    "location": "Unknown"
                }]
            }),
        )
        .unwrap();
    let clicks = ClickRecorder::new(store.clone(), EventLog::discard());

    assert_eq!(clicks.click_count("abcd"), 1);

    // 下一次写入升级为带版本的格式
    clicks.record_direct_click("abcd").unwrap();
    let raw = store.get(CLICKS_KEY).unwrap().unwrap();
    assert_eq!(raw["version"], 1);
    assert_eq!(raw["items"]["abcd"].as_array().unwrap().len(), 2);
}

#[test]
fn test_clicks_persist_in_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clicks.json");

    {
        let clicks = ClickRecorder::new(Arc::new(FileStore::new(&path).unwrap()), EventLog::discard());
        clicks.record_direct_click("abcd").unwrap();
        clicks.record_direct_click("abcd").unwrap();
    }

    let clicks = ClickRecorder::new(Arc::new(FileStore::new(&path).unwrap()), EventLog::discard());
    assert_eq!(clicks.click_count("abcd"), 2);
}

#[test]
fn test_concurrent_recorders_keep_every_click() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let clicks = ClickRecorder::new(store.clone(), EventLog::discard());
            thread::spawn(move || {
                for _ in 0..100 {
                    clicks.record_direct_click("busy").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let clicks = ClickRecorder::new(store, EventLog::discard());
    assert_eq!(clicks.click_count("busy"), 400);
}

#[test]
fn test_recorders_on_separate_file_stores_keep_every_click() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clicks.json");
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let clicks = ClickRecorder::new(Arc::new(FileStore::new(&path).unwrap()), EventLog::discard());
            thread::spawn(move || {
                for _ in 0..20 {
                    clicks.record_direct_click("abcd").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let clicks = ClickRecorder::new(Arc::new(FileStore::new(&path).unwrap()), EventLog::discard());
    assert_eq!(clicks.click_count("abcd"), 60);
}
