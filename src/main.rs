//! Trend Pulse binary entrypoint.
//! Boots the Axum HTTP server: config, tracing, refresh scheduler, favorites, metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_pulse::{bootstrap, config, metrics::Metrics, router, App};

/// Compact logs by default; `TREND_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trend_pulse=info,warn"));
    let json = std::env::var("TREND_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // the runtime may already have installed a subscriber; keep it then
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_default().context("loading trend-pulse config")?;
    tracing::info!(
        refresh_secs = cfg.refresh_interval_secs,
        favorites_dir = %cfg.favorites_dir.display(),
        "config loaded"
    );

    // The recorder must exist before the startup refresh records anything.
    let metrics = Metrics::init().context("initializing metrics")?;
    let app = bootstrap(&cfg).context("bootstrapping trend-pulse")?;

    // Dropping the scheduler detaches its tasks; they run for the life of the process.
    let App { state, scheduler: _ } = app;
    let router = router(state).merge(metrics.router());

    Ok(router.into())
}
