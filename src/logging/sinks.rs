use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::{LogEntry, LogLevel, LogSink};
use crate::errors::{PocketlinkError, Result};
use crate::storage::{LOGS_KEY, RecordStore, load_collection, save_collection, update_collection};

/// Forwards entries to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: &LogEntry) {
        match entry.level {
            LogLevel::Info => info!(target: "pocketlink::events", data = %entry.data, "{}", entry.message),
            LogLevel::Warn => warn!(target: "pocketlink::events", data = %entry.data, "{}", entry.message),
            LogLevel::Error => error!(target: "pocketlink::events", data = %entry.data, "{}", entry.message),
        }
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}

/// Mirrors the most recent `capacity` entries into the record store under
/// [`LOGS_KEY`]. Each entry is appended with a single store update, so
/// several processes mirroring into one file keep each other's entries.
pub struct StoreMirrorSink {
    store: Arc<dyn RecordStore>,
    capacity: usize,
}

impl StoreMirrorSink {
    pub fn new(store: Arc<dyn RecordStore>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries as currently stored. A failed read yields an empty list.
    pub fn stored_entries(&self) -> Vec<LogEntry> {
        load_collection(self.store.as_ref(), LOGS_KEY).unwrap_or_else(|e| {
            error!("Failed to retrieve mirrored logs: {}", e);
            Vec::new()
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(LOGS_KEY)
    }

    fn append(&self, entry: &LogEntry) -> Result<()> {
        let capacity = self.capacity;
        update_collection(self.store.as_ref(), LOGS_KEY, |entries: &mut Vec<LogEntry>| {
            entries.push(entry.clone());
            let overflow = entries.len().saturating_sub(capacity);
            entries.drain(..overflow);
            Ok(())
        })
    }
}

impl LogSink for StoreMirrorSink {
    fn write(&self, entry: &LogEntry) {
        if self.capacity == 0 {
            return;
        }

        // 持久化失败只记录，不影响调用方
        let result = match self.append(entry) {
            Err(PocketlinkError::Serialization(e)) => {
                warn!("Mirrored logs unreadable, starting over: {}", e);
                save_collection(self.store.as_ref(), LOGS_KEY, &vec![entry.clone()])
            }
            other => other,
        };
        if let Err(e) = result {
            error!("Failed to persist logs: {}", e);
        }
    }
}
