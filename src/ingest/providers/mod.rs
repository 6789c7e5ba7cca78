// src/ingest/providers/mod.rs
pub mod coingecko;
pub mod newsapi;
pub mod reddit;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ingest::types::TrendSource;
use crate::relay::Relay;

/// The three built-in sources, in feed concatenation order.
pub fn default_sources(cfg: &AppConfig, relay: Arc<dyn Relay>) -> Vec<Arc<dyn TrendSource>> {
    vec![
        Arc::new(reddit::RedditProvider::new(relay.clone(), cfg.reddit_limit)),
        Arc::new(coingecko::CoinGeckoProvider::new(
            relay.clone(),
            cfg.coingecko_limit,
        )),
        Arc::new(newsapi::NewsApiProvider::new(
            relay,
            cfg.news_api_key.clone(),
            cfg.news_page_size,
        )),
    ]
}
