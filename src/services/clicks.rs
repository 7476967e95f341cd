//! Click Recorder: append-only click events keyed by shortcode.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::errors::{PocketlinkError, Result};
use crate::logging::EventLog;
use crate::storage::{CLICKS_KEY, ClickEvent, ClickLog, RecordStore, load_collection, update_collection};
use crate::utils::{Clock, SystemClock};

pub const DEFAULT_SOURCE: &str = "direct";
pub const DEFAULT_LOCATION: &str = "Unknown";

pub type ClickId = String;

pub struct ClickRecorder {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    log: EventLog,
}

impl ClickRecorder {
    pub fn new(store: Arc<dyn RecordStore>, log: EventLog) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            log,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Appends a click under `shortcode`.
    ///
    /// The code is not checked against the registry: clicks for unknown or
    /// expired codes are stored all the same. Store failures come back as
    /// [`PocketlinkError::StoreFailure`] and the click is not recorded.
    pub fn record_click(&self, shortcode: &str, source: &str, location: &str) -> Result<ClickId> {
        let click = ClickEvent {
            id: Uuid::now_v7().to_string(),
            timestamp: self.clock.now(),
            source: source.to_string(),
            location: location.to_string(),
        };
        let click_id = click.id.clone();

        update_collection(self.store.as_ref(), CLICKS_KEY, |clicks: &mut ClickLog| {
            clicks.entry(shortcode.to_string()).or_default().push(click);
            Ok(())
        })
        .map_err(|e| {
            self.log.error(
                "Failed to record click",
                json!({ "shortcode": shortcode, "error": e.message() }),
            );
            PocketlinkError::store_failure(e.message().to_string())
        })?;

        self.log.info(
            "Click recorded",
            json!({ "shortcode": shortcode, "source": source, "location": location }),
        );
        Ok(click_id)
    }

    pub fn record_direct_click(&self, shortcode: &str) -> Result<ClickId> {
        self.record_click(shortcode, DEFAULT_SOURCE, DEFAULT_LOCATION)
    }

    /// Every recorded click. An unreadable store yields an empty log.
    pub fn get_clicks(&self) -> ClickLog {
        load_collection(self.store.as_ref(), CLICKS_KEY).unwrap_or_else(|e| {
            self.log.error("Failed to retrieve clicks from storage", json!({ "error": e.message() }));
            ClickLog::new()
        })
    }

    pub fn clicks_for(&self, shortcode: &str) -> Vec<ClickEvent> {
        self.get_clicks().remove(shortcode).unwrap_or_default()
    }

    pub fn click_count(&self, shortcode: &str) -> usize {
        self.get_clicks().get(shortcode).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::utils::ManualClock;
    use chrono::TimeDelta;

    fn recorder() -> ClickRecorder {
        ClickRecorder::new(Arc::new(MemoryStore::new()), EventLog::discard())
    }

    #[test]
    fn test_defaults() {
        let recorder = recorder();
        recorder.record_direct_click("abcd").unwrap();

        let clicks = recorder.clicks_for("abcd");
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].source, "direct");
        assert_eq!(clicks[0].location, "Unknown");
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let clock = Arc::new(ManualClock::default());
        let recorder = recorder().with_clock(clock.clone());

        for source in ["first", "second", "third"] {
            recorder.record_click("abcd", source, "Earth").unwrap();
            clock.advance(TimeDelta::seconds(1));
        }

        let sources: Vec<String> = recorder
            .clicks_for("abcd")
            .into_iter()
            .map(|c| c.source)
            .collect();
        assert_eq!(sources, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_counts_per_code() {
        let recorder = recorder();
        recorder.record_direct_click("one1").unwrap();
        recorder.record_direct_click("one1").unwrap();
        recorder.record_direct_click("two2").unwrap();

        assert_eq!(recorder.click_count("one1"), 2);
        assert_eq!(recorder.click_count("two2"), 1);
        assert_eq!(recorder.click_count("none"), 0);
        assert_eq!(recorder.get_clicks().len(), 2);
    }

    #[test]
    fn test_click_ids_are_unique() {
        let recorder = recorder();
        let a = recorder.record_direct_click("abcd").unwrap();
        let b = recorder.record_direct_click("abcd").unwrap();
        assert_ne!(a, b);
    }
}
