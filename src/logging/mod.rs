//! Domain event log.
//!
//! Components receive an [`EventLog`] at construction and report every
//! operation through it as `(level, message, data)`. Where the entries end up
//! is decided by the attached [`LogSink`]s: forwarded to `tracing`, mirrored
//! into the record store, or captured in memory.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod init;
mod sinks;

pub use init::init_logging;
pub use sinks::{MemorySink, StoreMirrorSink, TracingSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry);
}

/// Cheap to clone; all clones share the same sinks.
#[derive(Clone, Default)]
pub struct EventLog {
    sinks: Arc<Vec<Arc<dyn LogSink>>>,
}

impl EventLog {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    /// An event log with no sinks. Entries are built and dropped.
    pub fn discard() -> Self {
        Self::default()
    }

    /// Forwards to `tracing` only.
    pub fn tracing() -> Self {
        Self::new(vec![Arc::new(TracingSink)])
    }

    pub fn with_sink(&self, sink: Arc<dyn LogSink>) -> Self {
        let mut sinks: Vec<Arc<dyn LogSink>> = self.sinks.iter().cloned().collect();
        sinks.push(sink);
        Self::new(sinks)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, data: Value) -> LogEntry {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: normalize_data(data),
        };

        for sink in self.sinks.iter() {
            sink.write(&entry);
        }

        entry
    }

    pub fn info(&self, message: impl Into<String>, data: Value) -> LogEntry {
        self.log(LogLevel::Info, message, data)
    }

    pub fn warn(&self, message: impl Into<String>, data: Value) -> LogEntry {
        self.log(LogLevel::Warn, message, data)
    }

    pub fn error(&self, message: impl Into<String>, data: Value) -> LogEntry {
        self.log(LogLevel::Error, message, data)
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

// payload 统一为对象，null 视为空对象
fn normalize_data(data: Value) -> Value {
    match data {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => data,
        other => serde_json::json!({ "value": other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_reach_every_sink() {
        let first = Arc::new(MemorySink::new());
        let second = Arc::new(MemorySink::new());
        let log = EventLog::new(vec![first.clone(), second.clone()]);

        log.info("hello", json!({"k": 1}));
        log.error("boom", Value::Null);

        assert_eq!(first.entries().len(), 2);
        assert_eq!(second.entries().len(), 2);
        assert_eq!(first.entries()[1].level, LogLevel::Error);
    }

    #[test]
    fn test_payload_is_always_an_object() {
        let log = EventLog::discard();
        assert_eq!(log.info("a", Value::Null).data, json!({}));
        assert_eq!(log.warn("b", json!(5)).data, json!({"value": 5}));
        assert_eq!(log.warn("c", json!({"x": true})).data, json!({"x": true}));
    }

    #[test]
    fn test_with_sink_leaves_original_untouched() {
        let sink = Arc::new(MemorySink::new());
        let base = EventLog::discard();
        let extended = base.with_sink(sink.clone());

        base.info("ignored", Value::Null);
        extended.info("kept", Value::Null);

        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].message, "kept");
    }

    #[test]
    fn test_level_serializes_uppercase() {
        assert_eq!(serde_json::to_value(LogLevel::Warn).unwrap(), json!("WARN"));
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }
}
