// src/ingest/providers/reddit.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::chart;
use crate::classify::classify_community;
use crate::ingest::types::TrendSource;
use crate::ingest::{image_url, lenient_vec, normalize_text, source_failed, truncate_chars, DESCRIPTION_MAX_CHARS};
use crate::relay::{Relay, RelayRequest};
use crate::trend::{Sentiment, TrendRecord};

const ORIGIN: &str = "www.reddit.com";
const FALLBACK_DESCRIPTION: &str = "Check out this trending post on Reddit";

#[derive(Debug, Deserialize, Default)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Deserialize, Default)]
struct ListingData {
    #[serde(default, deserialize_with = "lenient_vec")]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    downs: i64,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    created_utc: f64,
}

/// Hot posts from r/all.
pub struct RedditProvider {
    relay: Arc<dyn Relay>,
    limit: usize,
}

impl RedditProvider {
    pub fn new(relay: Arc<dyn Relay>, limit: usize) -> Self {
        Self { relay, limit }
    }

    fn request(&self) -> RelayRequest {
        RelayRequest::get(ORIGIN, format!("/r/all/hot.json?limit={}", self.limit))
    }

    async fn try_fetch(&self) -> Result<Vec<TrendRecord>> {
        let rsp = self.relay.send(&self.request()).await?;
        let listing: Listing = rsp.json()?;
        let posts = listing.data.children.into_iter().map(|c| c.data).collect();
        Ok(map_posts(posts, Utc::now(), &mut rand::rng()))
    }
}

/// Upvotes / 100 (floored), capped at 100 with no lower bound.
fn score_from_ups(ups: i64) -> i64 {
    ups.div_euclid(100).min(100)
}

fn map_posts<R: Rng>(posts: Vec<Post>, now: DateTime<Utc>, rng: &mut R) -> Vec<TrendRecord> {
    posts
        .into_iter()
        .map(|p| {
            let description = p
                .selftext
                .as_deref()
                .map(|s| truncate_chars(&normalize_text(s), DESCRIPTION_MAX_CHARS))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());
            let sentiment = if p.ups > p.downs {
                Sentiment::Positive
            } else {
                Sentiment::Neutral
            };
            TrendRecord {
                id: format!("reddit-{}", p.id),
                title: normalize_text(&p.title),
                source: format!("r/{}", p.subreddit),
                category: classify_community(&p.subreddit),
                popularity_score: score_from_ups(p.ups),
                description,
                url: format!("https://{ORIGIN}{}", p.permalink),
                image_url: image_url(p.thumbnail.as_deref()),
                timestamp: (p.created_utc * 1_000.0) as i64,
                sentiment: Some(sentiment),
                related_news: None,
                // seeded with raw upvotes; the chart clamp pins popular posts at 100
                chart_data: Some(chart::synthesize(p.ups, now, rng)),
            }
        })
        .collect()
}

#[async_trait]
impl TrendSource for RedditProvider {
    async fn fetch_trends(&self) -> Vec<TrendRecord> {
        match self.try_fetch().await {
            Ok(v) => v,
            Err(e) => source_failed(self.name(), &e),
        }
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
