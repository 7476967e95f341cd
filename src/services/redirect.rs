use std::sync::Arc;

use serde_json::json;

use super::clicks::{ClickId, ClickRecorder};
use super::registry::CodeRegistry;
use crate::errors::{PocketlinkError, Result};
use crate::logging::EventLog;
use crate::storage::UrlRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: String,
    pub record: UrlRecord,
    /// `None` when the click could not be persisted.
    pub click_id: Option<ClickId>,
}

/// Turns a short code into its target, counting the visit.
pub struct RedirectService {
    registry: Arc<CodeRegistry>,
    clicks: Arc<ClickRecorder>,
    log: EventLog,
}

impl RedirectService {
    pub fn new(registry: Arc<CodeRegistry>, clicks: Arc<ClickRecorder>, log: EventLog) -> Self {
        Self {
            registry,
            clicks,
            log,
        }
    }

    pub fn resolve(&self, shortcode: &str) -> Result<Resolution> {
        self.log.info("Handling redirect request", json!({ "shortcode": shortcode }));

        // 短码按原样匹配，不做 trim
        if shortcode.is_empty() {
            return Err(PocketlinkError::validation("Invalid short URL"));
        }

        let record = match self.registry.get_url(shortcode) {
            Some(record) => record,
            None => {
                self.log.warn("Short URL not found", json!({ "shortcode": shortcode }));
                return Err(PocketlinkError::not_found(format!(
                    "Short URL '{}' not found",
                    shortcode
                )));
            }
        };

        if self.registry.is_expired(&record) {
            self.log.warn("Attempt to access expired URL", json!({ "shortcode": shortcode }));
            return Err(PocketlinkError::expired(format!(
                "Short URL '{}' expired at {}",
                shortcode,
                record.expires_at.to_rfc3339()
            )));
        }

        // 点击记录失败不影响跳转
        let click_id = self.clicks.record_direct_click(shortcode).ok();

        self.log.info(
            "Redirecting to original URL",
            json!({ "shortcode": shortcode, "originalUrl": record.original_url }),
        );

        Ok(Resolution {
            target: record.original_url.clone(),
            record,
            click_id,
        })
    }
}
