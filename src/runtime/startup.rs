use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::AppConfig;
use crate::logging::{EventLog, StoreMirrorSink, TracingSink};
use crate::services::{ClickRecorder, CodeRegistry, RedirectService, Shortener, StatsService};
use crate::storage::{RecordStore, StorageFactory};

/// Everything a front end needs, wired from one [`AppConfig`].
pub struct StartupContext {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub log: EventLog,
    pub log_mirror: Arc<StoreMirrorSink>,
    pub registry: Arc<CodeRegistry>,
    pub clicks: Arc<ClickRecorder>,
    pub shortener: Shortener,
    pub redirect: RedirectService,
    pub stats: StatsService,
}

impl StartupContext {
    /// Opens the configured store and builds the services on top of it.
    pub fn prepare(config: AppConfig) -> Result<Self> {
        let store = StorageFactory::create(&config.storage).context("Failed to open record store")?;
        Ok(Self::with_store(config, store))
    }

    /// Same as [`StartupContext::prepare`] over an existing store.
    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let log_mirror = Arc::new(StoreMirrorSink::new(
            store.clone(),
            config.logging.mirror_capacity,
        ));
        let log = EventLog::new(vec![Arc::new(TracingSink), log_mirror.clone()]);

        let registry = Arc::new(CodeRegistry::new(
            store.clone(),
            log.clone(),
            config.shortener.clone(),
        ));
        let clicks = Arc::new(ClickRecorder::new(store.clone(), log.clone()));

        let shortener = Shortener::new(registry.clone(), log.clone());
        let redirect = RedirectService::new(registry.clone(), clicks.clone(), log.clone());
        let stats = StatsService::new(registry.clone(), clicks.clone(), log.clone());

        debug!("Services ready on {} store", store.backend_name());

        Self {
            config,
            store,
            log,
            log_mirror,
            registry,
            clicks,
            shortener,
            redirect,
            stats,
        }
    }
}
