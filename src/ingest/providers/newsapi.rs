// src/ingest/providers/newsapi.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::chart;
use crate::classify::classify_headline;
use crate::ingest::types::TrendSource;
use crate::ingest::{image_url, lenient_vec, normalize_text, source_failed, truncate_chars, DESCRIPTION_MAX_CHARS};
use crate::relay::{Relay, RelayRequest};
use crate::trend::{Sentiment, TrendRecord};

const ORIGIN: &str = "newsapi.org";
const FALLBACK_DESCRIPTION: &str = "Breaking news story";

#[derive(Debug, Deserialize, Default)]
struct Headlines {
    #[serde(default, deserialize_with = "lenient_vec")]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

/// US top headlines from NewsAPI.
pub struct NewsApiProvider {
    relay: Arc<dyn Relay>,
    api_key: String,
    page_size: usize,
}

impl NewsApiProvider {
    pub fn new(relay: Arc<dyn Relay>, api_key: impl Into<String>, page_size: usize) -> Self {
        Self {
            relay,
            api_key: api_key.into(),
            page_size,
        }
    }

    fn request(&self) -> RelayRequest {
        RelayRequest::get(
            ORIGIN,
            format!(
                "/v2/top-headlines?country=us&pageSize={}&apiKey={}",
                self.page_size, self.api_key
            ),
        )
    }

    async fn try_fetch(&self) -> Result<Vec<TrendRecord>> {
        let rsp = self.relay.send(&self.request()).await?;
        let headlines: Headlines = rsp.json()?;
        Ok(map_articles(headlines.articles, Utc::now(), &mut rand::rng()))
    }
}

fn parse_published_ms(ts: Option<&str>) -> Option<i64> {
    DateTime::parse_from_rfc3339(ts?)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| normalize_text(&v)).filter(|v| !v.is_empty())
}

fn map_articles<R: Rng>(articles: Vec<Article>, now: DateTime<Utc>, rng: &mut R) -> Vec<TrendRecord> {
    let now_ms = now.timestamp_millis();
    articles
        .into_iter()
        .enumerate()
        .map(|(index, a)| {
            let title = a.title.as_deref().map(normalize_text).unwrap_or_default();
            let raw_description = non_empty(a.description);
            let category = classify_headline(&title, raw_description.as_deref().unwrap_or_default());
            let description = raw_description
                .or_else(|| non_empty(a.content).map(|c| truncate_chars(&c, DESCRIPTION_MAX_CHARS)))
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());

            // no upstream popularity signal: score and chart seed are random
            let score = rng.random_range(50..100);
            let chart_seed = rng.random_range(0..100);

            TrendRecord {
                // index + fetch time: ids are unique per fetch, not stable across refreshes
                id: format!("news-{index}-{now_ms}"),
                title,
                source: a
                    .source
                    .and_then(|s| s.name)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "News".to_string()),
                category,
                popularity_score: score,
                description,
                url: a.url.unwrap_or_default(),
                image_url: image_url(a.url_to_image.as_deref()),
                timestamp: parse_published_ms(a.published_at.as_deref()).unwrap_or(now_ms),
                sentiment: Some(Sentiment::Neutral),
                related_news: Some(Vec::new()),
                chart_data: Some(chart::synthesize(chart_seed, now, rng)),
            }
        })
        .collect()
}

#[async_trait]
impl TrendSource for NewsApiProvider {
    async fn fetch_trends(&self) -> Vec<TrendRecord> {
        match self.try_fetch().await {
            Ok(v) => v,
            Err(e) => source_failed(self.name(), &e),
        }
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
