// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod chart;
pub mod classify;
pub mod config;
pub mod favorites;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod relay;
pub mod store;
pub mod trend;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::trend::{Category, CategoryFilter, TrendRecord};

use std::sync::Arc;
use tracing::info;

use crate::api::AppState;
use crate::config::{AppConfig, RelayMode};
use crate::favorites::FavoritesStore;
use crate::ingest::providers::default_sources;
use crate::ingest::scheduler::RefreshScheduler;
use crate::ingest::types::TrendSource;
use crate::relay::{DirectRelay, HttpRelay, Relay};
use crate::store::{FileKvStore, KvStore};

/// Running core: API state plus the scheduler that feeds it.
pub struct App {
    pub state: AppState,
    pub scheduler: RefreshScheduler,
}

pub fn build_relay(cfg: &AppConfig) -> anyhow::Result<Arc<dyn Relay>> {
    let relay: Arc<dyn Relay> = match cfg.relay_mode {
        RelayMode::Relay => Arc::new(HttpRelay::new(
            cfg.relay_url.clone(),
            cfg.request_timeout_secs,
        )?),
        RelayMode::Direct => Arc::new(DirectRelay::new(cfg.request_timeout_secs)?),
    };
    Ok(relay)
}

/// Wire the default sources, file-backed favorites and the scheduler.
/// Must be called inside a Tokio runtime.
pub fn bootstrap(cfg: &AppConfig) -> anyhow::Result<App> {
    let relay = build_relay(cfg)?;
    info!(mode = ?cfg.relay_mode, relay_url = %cfg.relay_url, "relay configured");
    let sources = default_sources(cfg, relay);
    let store = Arc::new(FileKvStore::new(cfg.favorites_dir.clone()));
    bootstrap_with(cfg, sources, store)
}

/// Same as [`bootstrap`] with caller-provided sources and storage.
pub fn bootstrap_with(
    cfg: &AppConfig,
    sources: Vec<Arc<dyn TrendSource>>,
    store: Arc<dyn KvStore>,
) -> anyhow::Result<App> {
    let favorites = Arc::new(FavoritesStore::load(store));
    let scheduler = RefreshScheduler::spawn(sources, cfg.refresh_interval())?;
    let state = AppState::new(scheduler.handle(), favorites);
    Ok(App { state, scheduler })
}
