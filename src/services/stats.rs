use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::clicks::ClickRecorder;
use super::registry::CodeRegistry;
use crate::logging::EventLog;
use crate::storage::{ClickEvent, ClickLog, UrlRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Expired,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub record: UrlRecord,
    pub short_url: String,
    pub status: LinkStatus,
    pub click_count: usize,
    pub clicks: Vec<ClickEvent>,
}

/// Clicks stored under one shortcode, whether or not a record exists for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeClicks {
    pub shortcode: String,
    pub registered: bool,
    pub click_count: usize,
    pub clicks: Vec<ClickEvent>,
}

/// Read-only view joining records with their click logs.
pub struct StatsService {
    registry: Arc<CodeRegistry>,
    clicks: Arc<ClickRecorder>,
    log: EventLog,
}

impl StatsService {
    pub fn new(registry: Arc<CodeRegistry>, clicks: Arc<ClickRecorder>, log: EventLog) -> Self {
        Self {
            registry,
            clicks,
            log,
        }
    }

    /// One entry per record, in creation order.
    pub fn overview(&self) -> Vec<LinkStats> {
        let records = self.registry.get_all_urls();
        let mut clicks = self.clicks.get_clicks();

        self.log.info(
            "Loaded statistics data",
            json!({ "urlCount": records.len(), "clickDataCount": clicks.len() }),
        );

        records
            .into_iter()
            .map(|record| self.build(record, &mut clicks))
            .collect()
    }

    pub fn for_code(&self, shortcode: &str) -> Option<LinkStats> {
        let record = self.registry.get_url(shortcode)?;
        let mut clicks = self.clicks.get_clicks();
        Some(self.build(record, &mut clicks))
    }

    /// One entry per shortcode in the click log, ordered by shortcode.
    /// Clicks recorded for codes that were never registered show up here
    /// with `registered == false`.
    pub fn click_analytics(&self) -> Vec<CodeClicks> {
        let registered: HashSet<String> = self
            .registry
            .get_all_urls()
            .into_iter()
            .map(|r| r.shortcode)
            .collect();

        self.clicks
            .get_clicks()
            .into_iter()
            .map(|(shortcode, clicks)| CodeClicks {
                registered: registered.contains(&shortcode),
                click_count: clicks.len(),
                shortcode,
                clicks,
            })
            .collect()
    }

    /// Analytics entry for one code; `None` when it has no clicks.
    pub fn clicks_for_code(&self, shortcode: &str) -> Option<CodeClicks> {
        let clicks = self.clicks.clicks_for(shortcode);
        if clicks.is_empty() {
            return None;
        }

        Some(CodeClicks {
            shortcode: shortcode.to_string(),
            registered: self.registry.get_url(shortcode).is_some(),
            click_count: clicks.len(),
            clicks,
        })
    }

    pub fn short_url(&self, shortcode: &str) -> String {
        self.registry.config().short_url(shortcode)
    }

    fn build(&self, record: UrlRecord, clicks: &mut ClickLog) -> LinkStats {
        let events = clicks.remove(&record.shortcode).unwrap_or_default();
        let status = if self.registry.is_expired(&record) {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        };

        LinkStats {
            short_url: self.short_url(&record.shortcode),
            status,
            click_count: events.len(),
            clicks: events,
            record,
        }
    }
}
