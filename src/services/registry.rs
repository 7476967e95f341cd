//! Code Registry: short code issuance and lookup.
//!
//! Creation runs as a single [`RecordStore::update`]: the uniqueness check,
//! the append and the write happen inside the store's own critical section,
//! so registries sharing a store never overwrite each other's records.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use uuid::Uuid;

use super::codegen::{AllocationPolicy, CodeSource, RandomCodes, allocate_code};
use crate::config::ShortenerConfig;
use crate::errors::{PocketlinkError, Result};
use crate::logging::EventLog;
use crate::storage::{RecordStore, URLS_KEY, UrlRecord, load_collection, update_collection};
use crate::utils::{Clock, SystemClock, is_valid_short_code, url_validator};

const SHORTCODE_FORMAT_MESSAGE: &str = "Shortcode must be at least 4 characters and contain only letters, numbers, hyphens, and underscores";

pub struct CodeRegistry {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
    log: EventLog,
    config: ShortenerConfig,
}

impl CodeRegistry {
    pub fn new(store: Arc<dyn RecordStore>, log: EventLog, config: ShortenerConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodes),
            log,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Creates and persists a new short URL.
    ///
    /// `validity_minutes` falls back to the configured default (30) when
    /// `None`. An empty `custom_shortcode` counts as absent. All validation
    /// runs before the store is touched; a failed call leaves it unchanged.
    pub fn create_short_url(
        &self,
        original_url: &str,
        validity_minutes: Option<f64>,
        custom_shortcode: Option<&str>,
    ) -> Result<UrlRecord> {
        let custom_shortcode = custom_shortcode.filter(|c| !c.is_empty());
        self.log.info(
            "Creating short URL",
            json!({
                "originalUrl": original_url,
                "validityMinutes": validity_minutes,
                "customShortcode": custom_shortcode,
            }),
        );

        if let Err(e) = url_validator::validate_url(original_url) {
            self.log.error("Invalid URL format", json!({ "originalUrl": original_url }));
            return Err(PocketlinkError::invalid_url(format!("'{}': {}", original_url, e)));
        }

        let created_at = self.clock.now();
        let expires_at = self.resolve_expiry(created_at, validity_minutes)?;

        if let Some(code) = custom_shortcode
            && !is_valid_short_code(code)
        {
            self.log.error(SHORTCODE_FORMAT_MESSAGE, json!({ "shortcode": code }));
            return Err(PocketlinkError::invalid_shortcode_format(format!(
                "'{}': {}",
                code, SHORTCODE_FORMAT_MESSAGE
            )));
        }

        let mut attempts = 1;
        let outcome = update_collection(
            self.store.as_ref(),
            URLS_KEY,
            |records: &mut Vec<UrlRecord>| {
                let shortcode = match custom_shortcode {
                    Some(code) => {
                        if records.iter().any(|r| r.shortcode == code) {
                            return Err(PocketlinkError::shortcode_taken(format!(
                                "Shortcode '{}' is already in use",
                                code
                            )));
                        }
                        code.to_string()
                    }
                    None => {
                        let allocation = allocate_code(
                            self.codes.as_ref(),
                            AllocationPolicy::from(&self.config),
                            |candidate| records.iter().any(|r| r.shortcode == candidate),
                        )?;
                        attempts = allocation.attempts;
                        allocation.code
                    }
                };

                let record = UrlRecord::new(
                    Uuid::now_v7().to_string(),
                    original_url,
                    shortcode,
                    created_at,
                    expires_at,
                );
                records.push(record.clone());
                Ok((record, records.len()))
            },
        );

        // 存储锁内不能写日志，镜像 sink 会回写同一个存储
        let (record, count) = match outcome {
            Ok(created) => created,
            Err(e @ PocketlinkError::ShortcodeTaken(_)) => {
                self.log.error("Shortcode is already in use", json!({ "shortcode": custom_shortcode }));
                return Err(e);
            }
            Err(e @ PocketlinkError::CodeSpaceExhausted(_)) => {
                self.log.error("Short code allocation failed", json!({ "error": e.message() }));
                return Err(e);
            }
            Err(e) if e.is_validation() => return Err(e),
            Err(e) => {
                self.log.error("Failed to save URLs to storage", json!({ "error": e.message() }));
                return Err(PocketlinkError::store_failure(e.message().to_string()));
            }
        };

        if attempts > 1 {
            self.log.warn(
                "Short code collision, regenerated",
                json!({ "attempts": attempts, "shortcode": record.shortcode }),
            );
        }
        self.log.info("URLs saved to storage", json!({ "count": count }));
        self.log.info(
            "Short URL created successfully",
            json!({ "shortcode": record.shortcode }),
        );

        Ok(record)
    }

    /// Exact-match lookup. Expired records are returned as well; callers
    /// decide with [`CodeRegistry::is_expired`].
    pub fn get_url(&self, shortcode: &str) -> Option<UrlRecord> {
        let found = self
            .load_records_for_read()
            .into_iter()
            .find(|r| r.shortcode == shortcode);

        match &found {
            Some(_) => self.log.info("URL retrieved by shortcode", json!({ "shortcode": shortcode })),
            None => self.log.warn("URL not found for shortcode", json!({ "shortcode": shortcode })),
        };

        found
    }

    /// All records in creation order.
    pub fn get_all_urls(&self) -> Vec<UrlRecord> {
        let records = self.load_records_for_read();
        self.log.info("Retrieved all URLs", json!({ "count": records.len() }));
        records
    }

    pub fn is_expired(&self, record: &UrlRecord) -> bool {
        record.is_expired_at(self.clock.now())
    }

    pub fn is_valid_url(&self, candidate: &str) -> bool {
        url_validator::is_valid_url(candidate)
    }

    /// `false` when the code is in use or the store cannot be read.
    pub fn is_shortcode_available(&self, shortcode: &str) -> bool {
        match load_collection::<Vec<UrlRecord>>(self.store.as_ref(), URLS_KEY) {
            Ok(records) => !records.iter().any(|r| r.shortcode == shortcode),
            Err(e) => {
                self.log.error("Failed to retrieve URLs from storage", json!({ "error": e.message() }));
                false
            }
        }
    }

    /// Expiry for a record created at `created_at`. Non-positive, non-finite
    /// and out-of-range validities are rejected before the store is touched.
    fn resolve_expiry(
        &self,
        created_at: DateTime<Utc>,
        validity_minutes: Option<f64>,
    ) -> Result<DateTime<Utc>> {
        let minutes = validity_minutes.unwrap_or(self.config.default_validity_minutes);
        if !(minutes.is_finite() && minutes > 0.0) {
            self.log.error(
                "Validity must be a positive number",
                json!({ "validityMinutes": validity_minutes }),
            );
            return Err(PocketlinkError::invalid_validity(format!(
                "Validity must be a positive number, got {}",
                minutes
            )));
        }

        // 至少 1 毫秒，保证 expires_at > created_at
        let millis = (minutes * 60_000.0).round().max(1.0);
        let expires_at = (millis < i64::MAX as f64)
            .then(|| TimeDelta::try_milliseconds(millis as i64))
            .flatten()
            .and_then(|validity| created_at.checked_add_signed(validity));

        expires_at.ok_or_else(|| {
            self.log.error(
                "Validity is out of range",
                json!({ "validityMinutes": validity_minutes }),
            );
            PocketlinkError::invalid_validity(format!("Validity of {} minutes is out of range", minutes))
        })
    }

    fn load_records_for_read(&self) -> Vec<UrlRecord> {
        load_collection(self.store.as_ref(), URLS_KEY).unwrap_or_else(|e| {
            self.log.error("Failed to retrieve URLs from storage", json!({ "error": e.message() }));
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemorySink};
    use crate::storage::MemoryStore;
    use crate::utils::ManualClock;

    fn registry() -> (CodeRegistry, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let log = EventLog::new(vec![sink.clone()]);
        let registry = CodeRegistry::new(
            Arc::new(MemoryStore::new()),
            log,
            ShortenerConfig::default(),
        );
        (registry, sink)
    }

    #[test]
    fn test_default_validity_is_thirty_minutes() {
        let clock = Arc::new(ManualClock::default());
        let (registry, _) = registry();
        let registry = registry.with_clock(clock);

        let record = registry.create_short_url("https://example.com", None, None).unwrap();
        assert_eq!(record.expires_at - record.created_at, TimeDelta::minutes(30));
    }

    #[test]
    fn test_fractional_validity() {
        let (registry, _) = registry();
        let record = registry
            .create_short_url("https://example.com", Some(0.5), None)
            .unwrap();
        assert_eq!(record.expires_at - record.created_at, TimeDelta::seconds(30));
    }

    #[test]
    fn test_tiny_validity_still_moves_expiry_forward() {
        let (registry, _) = registry();
        let record = registry
            .create_short_url("https://example.com", Some(1e-9), None)
            .unwrap();
        assert!(record.expires_at > record.created_at);
    }

    #[test]
    fn test_rejects_non_positive_and_non_finite_validity() {
        let (registry, _) = registry();
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY, 1e300] {
            let result = registry.create_short_url("https://example.com", Some(bad), None);
            assert!(
                matches!(result, Err(PocketlinkError::InvalidValidity(_))),
                "validity {} should be rejected",
                bad
            );
        }
        assert!(registry.get_all_urls().is_empty());
    }

    #[test]
    fn test_overflowing_expiry_is_rejected_before_writing() {
        let (registry, sink) = registry();
        // 可以表示为毫秒，但加到当前时间会溢出
        let result = registry.create_short_url("https://example.com", Some(1e14), Some("overflow"));

        assert!(matches!(result, Err(PocketlinkError::InvalidValidity(_))));
        assert!(registry.get_all_urls().is_empty());
        let entries = sink.entries();
        assert!(entries.iter().any(|e| e.level == LogLevel::Error && e.message == "Validity is out of range"));
        assert!(!entries.iter().any(|e| e.message == "Validity must be a positive number"));
    }

    #[test]
    fn test_empty_custom_code_is_generated() {
        let (registry, _) = registry();
        let record = registry
            .create_short_url("https://example.com", None, Some(""))
            .unwrap();
        assert_eq!(record.shortcode.len(), 6);
    }

    #[test]
    fn test_operations_are_logged() {
        let (registry, sink) = registry();
        registry.create_short_url("https://example.com", None, Some("logme")).unwrap();
        registry.get_url("missing");

        let entries = sink.entries();
        assert_eq!(entries[0].message, "Creating short URL");
        assert!(entries.iter().any(|e| e.message == "Short URL created successfully"
            && e.data["shortcode"] == "logme"));
        let last = entries.last().unwrap();
        assert_eq!(last.level, LogLevel::Warn);
        assert_eq!(last.message, "URL not found for shortcode");
    }

    #[test]
    fn test_record_ids_are_unique() {
        let (registry, _) = registry();
        let a = registry.create_short_url("https://a.example", None, None).unwrap();
        let b = registry.create_short_url("https://b.example", None, None).unwrap();
        assert_ne!(a.id, b.id);
    }
}
