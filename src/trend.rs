// src/trend.rs
//! Unified trend record shared by every source adapter, the feed and favorites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored category of a trend. `All` lives in [`CategoryFilter`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tech,
    Crypto,
    Fashion,
    Entertainment,
    Sports,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tech,
        Category::Crypto,
        Category::Fashion,
        Category::Entertainment,
        Category::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "Tech",
            Category::Crypto => "Crypto",
            Category::Fashion => "Fashion",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category selector emitted by the UI: one of the five categories or `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(t))
            .map(|c| CategoryFilter::Only(*c))
            .ok_or_else(|| anyhow::anyhow!("unknown category: {t}"))
    }
}

impl From<Category> for CategoryFilter {
    fn from(c: Category) -> Self {
        CategoryFilter::Only(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
    pub source: String,
}

/// One sample of the synthetic popularity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub id: String, // "{prefix}-{native id}"
    pub title: String,
    pub source: String,
    pub category: Category,
    /// Nominally 0..=100; scale differs per source.
    pub popularity_score: i64,
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: i64, // epoch ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_news: Option<Vec<RelatedLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Vec<ChartPoint>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_parses_tokens_case_insensitively() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            " crypto ".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Crypto)
        );
        assert!("Politics".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn record_serializes_camel_case_and_skips_absent_optionals() {
        let r = TrendRecord {
            id: "reddit-abc".into(),
            title: "t".into(),
            source: "r/rust".into(),
            category: Category::Tech,
            popularity_score: 42,
            description: "d".into(),
            url: "https://example.test".into(),
            image_url: None,
            timestamp: 1_700_000_000_000,
            sentiment: Some(Sentiment::Positive),
            related_news: None,
            chart_data: None,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["popularityScore"], 42);
        assert_eq!(v["category"], "Tech");
        assert_eq!(v["sentiment"], "positive");
        assert!(v.get("imageUrl").is_none());
        assert!(v.get("chartData").is_none());
    }
}
