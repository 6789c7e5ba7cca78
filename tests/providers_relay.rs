// tests/providers_relay.rs
//
// Source adapters against a stub relay serving canned upstream bodies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use trend_pulse::ingest::providers::{
    coingecko::CoinGeckoProvider, newsapi::NewsApiProvider, reddit::RedditProvider,
};
use trend_pulse::ingest::types::TrendSource;
use trend_pulse::relay::{Relay, RelayRequest, RelayResponse};
use trend_pulse::trend::{Category, Sentiment};

/// Serves a fixed response per origin and records every envelope it sees.
#[derive(Default)]
struct StubRelay {
    responses: HashMap<&'static str, (u16, String)>,
    seen: Mutex<Vec<RelayRequest>>,
}

impl StubRelay {
    fn with(mut self, origin: &'static str, status: u16, body: &str) -> Self {
        self.responses.insert(origin, (status, body.to_string()));
        self
    }
}

#[async_trait]
impl Relay for StubRelay {
    async fn send(&self, req: &RelayRequest) -> Result<RelayResponse> {
        self.seen.lock().push(req.clone());
        let (status, body) = self
            .responses
            .get(req.origin.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("connection refused"))?;
        Ok(RelayResponse { status, body })
    }
}

#[tokio::test]
async fn reddit_maps_hot_listing() {
    let relay = Arc::new(StubRelay::default().with(
        "www.reddit.com",
        200,
        include_str!("fixtures/reddit_hot.json"),
    ));
    let p = RedditProvider::new(relay.clone(), 15);
    let out = p.fetch_trends().await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, "reddit-1abcde");
    assert_eq!(out[0].title, "Rust 1.80 released with LazyCell & LazyLock");
    assert_eq!(out[0].category, Category::Tech);
    assert_eq!(out[0].popularity_score, 84);
    assert_eq!(
        out[0].image_url.as_deref(),
        Some("https://b.thumbs.redditmedia.com/abc.jpg")
    );
    assert_eq!(out[1].source, "r/nba");
    assert_eq!(out[1].category, Category::Sports);
    assert_eq!(out[1].description, "Post your takes here.");
    assert_eq!(out[1].image_url, None);

    let seen = relay.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/r/all/hot.json?limit=15");
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].protocol, "https");
}

#[tokio::test]
async fn coingecko_maps_trending_and_respects_limit() {
    let relay = Arc::new(StubRelay::default().with(
        "api.coingecko.com",
        200,
        include_str!("fixtures/coingecko_trending.json"),
    ));
    let out = CoinGeckoProvider::new(relay.clone(), 1).fetch_trends().await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "crypto-bitcoin");
    assert_eq!(out[0].title, "Bitcoin (BTC)");
    assert_eq!(out[0].popularity_score, 99);
    assert_eq!(out[0].sentiment, Some(Sentiment::Positive));
    assert_eq!(relay.seen.lock()[0].path, "/api/v3/search/trending");
}

#[tokio::test]
async fn newsapi_maps_headlines() {
    let relay = Arc::new(StubRelay::default().with(
        "newsapi.org",
        200,
        include_str!("fixtures/newsapi_headlines.json"),
    ));
    let out = NewsApiProvider::new(relay.clone(), "k3y", 15)
        .fetch_trends()
        .await;

    assert_eq!(out.len(), 2);
    assert!(out[0].id.starts_with("news-0-"));
    assert_eq!(out[0].source, "Associated Press");
    assert_eq!(out[0].category, Category::Sports);
    assert_eq!(out[1].category, Category::Fashion);
    assert_eq!(out[1].description, "Breaking news story");
    assert!(out.iter().all(|r| (50..100).contains(&r.popularity_score)));
    assert_eq!(
        relay.seen.lock()[0].path,
        "/v2/top-headlines?country=us&pageSize=15&apiKey=k3y"
    );
}

#[tokio::test]
async fn non_success_status_yields_empty() {
    let relay = Arc::new(StubRelay::default().with("newsapi.org", 401, r#"{"status":"error"}"#));
    let out = NewsApiProvider::new(relay, "demo", 15).fetch_trends().await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn relay_failure_yields_empty() {
    let relay = Arc::new(StubRelay::default());
    assert!(RedditProvider::new(relay.clone(), 15)
        .fetch_trends()
        .await
        .is_empty());
    assert!(CoinGeckoProvider::new(relay, 10)
        .fetch_trends()
        .await
        .is_empty());
}

#[tokio::test]
async fn malformed_payload_yields_empty() {
    let relay = Arc::new(StubRelay::default().with("www.reddit.com", 200, "<html>rate limited</html>"));
    assert!(RedditProvider::new(relay, 15).fetch_trends().await.is_empty());
}

#[tokio::test]
async fn missing_optional_structures_yield_empty_without_error() {
    let relay = Arc::new(
        StubRelay::default()
            .with("www.reddit.com", 200, r#"{"kind":"Listing"}"#)
            .with("api.coingecko.com", 200, r#"{"nfts":[]}"#),
    );
    assert!(RedditProvider::new(relay.clone(), 15)
        .fetch_trends()
        .await
        .is_empty());
    assert!(CoinGeckoProvider::new(relay, 10)
        .fetch_trends()
        .await
        .is_empty());
}
