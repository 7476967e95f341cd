//! Record Store: a synchronous JSON key-value interface.
//!
//! Every logical collection (URL records, click log, mirrored log entries)
//! lives under one key and is always read and written as a whole.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::{PocketlinkError, Result};

pub mod file;
pub mod memory;
pub mod models;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use models::{ClickEvent, ClickLog, SCHEMA_VERSION, UrlRecord};

/// Key holding the ordered sequence of [`UrlRecord`].
pub const URLS_KEY: &str = "shortened_urls";
/// Key holding the shortcode -> [`ClickEvent`] list mapping.
pub const CLICKS_KEY: &str = "url_clicks";
/// Key holding mirrored log entries.
pub const LOGS_KEY: &str = "app_logs";

pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Replaces the value under `key` with `apply(current)` as one atomic
    /// step. No other `set`, `remove` or `update` on the same store can land
    /// between the read and the write. `apply` runs exactly once and must not
    /// call back into the store. When it fails nothing is written.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Value>,
    ) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

/// Reads a versioned collection, falling back to `T::default()` when the key
/// is absent.
pub fn load_collection<T>(store: &dyn RecordStore, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(value) => {
            let (version, items) = models::decode_collection(value)?;
            debug!("Loaded '{}' (schema v{}) from {}", key, version, store.backend_name());
            Ok(items)
        }
        None => Ok(T::default()),
    }
}

/// Writes a whole collection wrapped in the current schema envelope.
pub fn save_collection<T: Serialize>(store: &dyn RecordStore, key: &str, items: &T) -> Result<()> {
    let value = models::encode_collection(items)?;
    store.set(key, &value)
}

/// Read-modify-write of a whole collection through [`RecordStore::update`].
///
/// `mutate` sees the collection as stored at that moment; its return value is
/// handed back once the new collection has been written. An error from
/// `mutate` aborts the write and is returned unchanged.
pub fn update_collection<T, R, F>(store: &dyn RecordStore, key: &str, mutate: F) -> Result<R>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T) -> Result<R>,
{
    let mut mutate = Some(mutate);
    let mut output = None;

    store.update(key, &mut |current| {
        let mut items: T = match current {
            Some(value) => models::decode_collection(value)?.1,
            None => T::default(),
        };
        let mutate = mutate
            .take()
            .ok_or_else(|| PocketlinkError::store_failure("Update callback invoked twice"))?;
        output = Some(mutate(&mut items)?);
        models::encode_collection(&items)
    })?;

    output.ok_or_else(|| PocketlinkError::store_failure(format!("Update of '{}' did not run", key)))
}

pub struct StorageFactory;

impl StorageFactory {
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn RecordStore>> {
        let store: Arc<dyn RecordStore> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => {
                let store = FileStore::new(&config.path)?;
                debug!("File store path: {}", store.path().display());
                Arc::new(store)
            }
        };

        info!("Using record store backend: {}", store.backend_name());
        Ok(store)
    }
}
