use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{PocketlinkError, Result};

/// Current layout version written by every save.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub id: String,
    pub original_url: String,
    pub shortcode: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Fields this version does not know about, such as the `clicks` counter
    /// of older payloads. Carried through rewrites unchanged.
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

impl UrlRecord {
    pub fn new(
        id: impl Into<String>,
        original_url: impl Into<String>,
        shortcode: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            original_url: original_url.into(),
            shortcode: shortcode.into(),
            created_at,
            expires_at,
            extra: Map::new(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
}

/// Click events grouped by shortcode, each list in insertion order.
pub type ClickLog = BTreeMap<String, Vec<ClickEvent>>;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    items: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    items: T,
}

// 旧数据没有 version 字段，直接是数组或对象
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Versioned(Envelope<T>),
    Legacy(T),
}

pub(crate) fn encode_collection<T: Serialize>(items: &T) -> Result<Value> {
    Ok(serde_json::to_value(EnvelopeRef {
        version: SCHEMA_VERSION,
        items,
    })?)
}

/// Returns the schema version found (0 for legacy payloads) and the items.
pub(crate) fn decode_collection<T: DeserializeOwned>(value: Value) -> Result<(u32, T)> {
    let stored: Stored<T> = serde_json::from_value(value).map_err(|e| {
        PocketlinkError::serialization(format!("Unrecognized stored collection: {}", e))
    })?;

    match stored {
        Stored::Versioned(envelope) if envelope.version > SCHEMA_VERSION => {
            Err(PocketlinkError::serialization(format!(
                "Stored schema version {} is newer than supported version {}",
                envelope.version, SCHEMA_VERSION
            )))
        }
        Stored::Versioned(envelope) => Ok((envelope.version, envelope.items)),
        Stored::Legacy(items) => Ok((0, items)),
    }
}
