// src/filter.rs
//! In-memory filtering of the current feed.

use crate::trend::{CategoryFilter, TrendRecord};

fn matches_query(r: &TrendRecord, needle_lower: &str) -> bool {
    r.title.to_lowercase().contains(needle_lower)
        || r.description.to_lowercase().contains(needle_lower)
        || r.source.to_lowercase().contains(needle_lower)
}

/// Records of exactly `category`; `All` keeps everything.
pub fn by_category(records: &[TrendRecord], category: CategoryFilter) -> Vec<&TrendRecord> {
    records.iter().filter(|r| category.matches(r.category)).collect()
}

/// Case-insensitive substring search over title, description and source.
/// A blank query keeps everything; otherwise the query is matched as given,
/// surrounding spaces included.
pub fn search<'a>(records: &'a [TrendRecord], query: &str) -> Vec<&'a TrendRecord> {
    match needle(query) {
        None => records.iter().collect(),
        Some(n) => records.iter().filter(|r| matches_query(r, &n)).collect(),
    }
}

fn needle(query: &str) -> Option<String> {
    (!query.trim().is_empty()).then(|| query.to_lowercase())
}

/// Category and text query applied together, one pass per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: CategoryFilter,
    pub q: Option<String>,
}

impl FeedQuery {
    pub fn new(category: CategoryFilter, q: Option<String>) -> Self {
        Self { category, q }
    }

    pub fn apply<'a>(&self, records: &'a [TrendRecord]) -> Vec<&'a TrendRecord> {
        let needle = self.q.as_deref().and_then(needle);
        records
            .iter()
            .filter(|r| self.category.matches(r.category))
            .filter(|r| needle.as_deref().map_or(true, |n| matches_query(r, n)))
            .collect()
    }
}
