// src/ingest/providers/coingecko.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::chart;
use crate::ingest::types::TrendSource;
use crate::ingest::{image_url, lenient_vec, source_failed};
use crate::relay::{Relay, RelayRequest};
use crate::trend::{Category, Sentiment, TrendRecord};

const ORIGIN: &str = "api.coingecko.com";
const PATH: &str = "/api/v3/search/trending";
const UNRANKED_SCORE: i64 = 50;

#[derive(Debug, Deserialize, Default)]
struct Trending {
    #[serde(default, deserialize_with = "lenient_vec")]
    coins: Vec<CoinWrapper>,
}

#[derive(Debug, Deserialize)]
struct CoinWrapper {
    item: Coin,
}

#[derive(Debug, Deserialize)]
struct Coin {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    market_cap_rank: Option<i64>,
    #[serde(default)]
    thumb: Option<String>,
    #[serde(default)]
    small: Option<String>,
}

impl Coin {
    /// Rank 0 is treated like a missing rank.
    fn rank(&self) -> Option<i64> {
        self.market_cap_rank.filter(|r| *r != 0)
    }
}

/// Trending coins from the CoinGecko search endpoint.
pub struct CoinGeckoProvider {
    relay: Arc<dyn Relay>,
    limit: usize,
}

impl CoinGeckoProvider {
    pub fn new(relay: Arc<dyn Relay>, limit: usize) -> Self {
        Self { relay, limit }
    }

    async fn try_fetch(&self) -> Result<Vec<TrendRecord>> {
        let rsp = self.relay.send(&RelayRequest::get(ORIGIN, PATH)).await?;
        let trending: Trending = rsp.json()?;
        let coins = trending.coins.into_iter().take(self.limit).map(|c| c.item).collect();
        Ok(map_coins(coins, Utc::now(), &mut rand::rng()))
    }
}

/// `max(1, 100 - rank)`; no upper bound for negative ranks.
fn score_from_rank(rank: Option<i64>) -> i64 {
    rank.map(|r| (100 - r).max(1)).unwrap_or(UNRANKED_SCORE)
}

fn map_coins<R: Rng>(coins: Vec<Coin>, now: DateTime<Utc>, rng: &mut R) -> Vec<TrendRecord> {
    coins
        .into_iter()
        .map(|c| {
            let rank = c.rank();
            let rank_label = rank.map_or_else(|| "N/A".to_string(), |r| r.to_string());
            let image = image_url(c.thumb.as_deref()).or_else(|| image_url(c.small.as_deref()));
            TrendRecord {
                id: format!("crypto-{}", c.id),
                title: format!("{} ({})", c.name, c.symbol),
                source: "CoinGecko".to_string(),
                category: Category::Crypto,
                popularity_score: score_from_rank(rank),
                description: format!(
                    "Rank #{rank_label} - {} is trending in crypto markets",
                    c.name
                ),
                url: format!("https://www.coingecko.com/en/coins/{}", c.id),
                image_url: image,
                timestamp: now.timestamp_millis(),
                sentiment: Some(Sentiment::Positive),
                related_news: None,
                chart_data: Some(chart::synthesize(
                    rank.map_or(UNRANKED_SCORE, |r| 100 - r),
                    now,
                    rng,
                )),
            }
        })
        .collect()
}

#[async_trait]
impl TrendSource for CoinGeckoProvider {
    async fn fetch_trends(&self) -> Vec<TrendRecord> {
        match self.try_fetch().await {
            Ok(v) => v,
            Err(e) => source_failed(self.name(), &e),
        }
    }

    fn name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn maps_ranked_and_unranked_coins() {
        let t: Trending = serde_json::from_str(
            r#"{"coins":[
                {"item":{"id":"pepe","name":"Pepe","symbol":"PEPE","market_cap_rank":24,"thumb":"https://img/pepe.png"}},
                {"item":{"id":"newcoin","name":"New","symbol":"NEW","market_cap_rank":null,"thumb":"","small":"https://img/new.png"}}
            ]}"#,
        )
        .unwrap();
        let now = Utc::now();
        let coins = t.coins.into_iter().map(|c| c.item).collect();
        let out = map_coins(coins, now, &mut StdRng::seed_from_u64(9));

        assert_eq!(out[0].id, "crypto-pepe");
        assert_eq!(out[0].title, "Pepe (PEPE)");
        assert_eq!(out[0].popularity_score, 76);
        assert_eq!(
            out[0].description,
            "Rank #24 - Pepe is trending in crypto markets"
        );
        assert_eq!(out[0].url, "https://www.coingecko.com/en/coins/pepe");
        assert_eq!(out[0].image_url.as_deref(), Some("https://img/pepe.png"));
        assert_eq!(out[0].timestamp, now.timestamp_millis());

        assert_eq!(out[1].popularity_score, UNRANKED_SCORE);
        assert_eq!(
            out[1].description,
            "Rank #N/A - New is trending in crypto markets"
        );
        assert_eq!(out[1].image_url.as_deref(), Some("https://img/new.png"));
        assert!(out.iter().all(|r| r.category == Category::Crypto));
    }

    #[test]
    fn coin_without_item_or_id_does_not_drop_the_rest() {
        let t: Trending = serde_json::from_str(
            r#"{"coins":[
                {"score":0},
                {"item":{"name":"Nameless","symbol":"NL","market_cap_rank":3}},
                {"item":{"id":"btc","name":"Bitcoin","symbol":"BTC","market_cap_rank":1}}
            ]}"#,
        )
        .unwrap();
        let coins = t.coins.into_iter().map(|c| c.item).collect();
        let out = map_coins(coins, Utc::now(), &mut StdRng::seed_from_u64(2));
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["crypto-", "crypto-btc"]);
        assert_eq!(out[1].popularity_score, 99);
    }

    #[test]
    fn score_floor_is_one() {
        assert_eq!(score_from_rank(Some(1)), 99);
        assert_eq!(score_from_rank(Some(250)), 1);
        assert_eq!(score_from_rank(None), 50);
    }
}
