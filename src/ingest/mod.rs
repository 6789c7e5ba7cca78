// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::TrendSource;
use crate::trend::TrendRecord;
use anyhow::{Context, Result};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound for descriptions taken from long-form upstream text.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Register HELP text with whatever recorder is installed right now.
pub fn describe_metrics() {
    describe_counter!(
        "trends_fetched_total",
        "Trend records returned per source."
    );
    describe_counter!(
        "trends_source_errors_total",
        "Source fetch/parse errors (recovered as empty results)."
    );
    describe_histogram!("trends_fetch_ms", "Aggregation fan-out time in milliseconds.");
    describe_counter!("trends_refresh_total", "Refresh cycles requested.");
    describe_counter!(
        "trends_refresh_stale_total",
        "Refresh results discarded because a newer refresh was requested."
    );
    describe_counter!("trends_refresh_errors_total", "Refresh cycles that failed.");
    describe_gauge!(
        "trends_last_refresh_ts",
        "Unix ts when the feed was last replaced."
    );
    describe_counter!(
        "favorites_persist_errors_total",
        "Favorites writes that failed to reach storage."
    );
}

/// Normalize upstream text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, "");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Keep at most `max` chars (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Accept only absolute http(s) image links; anything else renders as no image.
pub fn image_url(candidate: Option<&str>) -> Option<String> {
    let c = candidate?.trim();
    (c.starts_with("http://") || c.starts_with("https://")).then(|| c.to_string())
}

/// Shared failure path for adapters: log, count, contribute nothing.
pub(crate) fn source_failed(source: &'static str, err: &anyhow::Error) -> Vec<TrendRecord> {
    ensure_metrics_described();
    tracing::warn!(target: "ingest", error = ?err, source, "source fetch failed");
    counter!("trends_source_errors_total", "source" => source).increment(1);
    Vec::new()
}

/// Serde `deserialize_with` for upstream arrays: elements that fail to
/// deserialize are dropped one by one instead of failing the whole listing.
pub(crate) fn lenient_vec<'de, D, T>(d: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(target: "ingest", error = %e, "skipping malformed upstream item");
                None
            }
        })
        .collect())
}

/// Stable sort, highest score first. Ties keep input order.
pub fn rank(mut records: Vec<TrendRecord>) -> Vec<TrendRecord> {
    records.sort_by(|a, b| b.popularity_score.cmp(&a.popularity_score));
    records
}

/// Fetch every source concurrently, then merge and rank.
///
/// Each source runs in its own task. A source that aborts (panics) fails the
/// whole call; ordinary upstream errors are already empty vecs by then.
pub async fn fetch_all(sources: &[Arc<dyn TrendSource>]) -> Result<Vec<TrendRecord>> {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();

    let tasks = sources.iter().map(|s| {
        let s = Arc::clone(s);
        tokio::spawn(async move { s.fetch_trends().await })
    });
    let results = join_all(tasks).await;

    let mut merged = Vec::new();
    for (source, res) in sources.iter().zip(results) {
        let mut batch = res.with_context(|| format!("source task '{}' aborted", source.name()))?;
        tracing::debug!(target: "ingest", source = source.name(), count = batch.len(), "source done");
        counter!("trends_fetched_total", "source" => source.name()).increment(batch.len() as u64);
        merged.append(&mut batch);
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("trends_fetch_ms").record(ms);

    Ok(rank(merged))
}
