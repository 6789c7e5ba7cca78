// tests/ingest_aggregate.rs
//
// Fan-out / merge / rank behaviour of the aggregation engine.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use trend_pulse::ingest::{self, types::TrendSource};
use trend_pulse::trend::{Category, TrendRecord};

fn rec(id: &str, score: i64) -> TrendRecord {
    TrendRecord {
        id: id.to_string(),
        title: id.to_string(),
        source: "mock".into(),
        category: Category::Entertainment,
        popularity_score: score,
        description: String::new(),
        url: String::new(),
        image_url: None,
        timestamp: 0,
        sentiment: None,
        related_news: None,
        chart_data: None,
    }
}

struct Fixed {
    name: &'static str,
    delay: Duration,
    items: Vec<TrendRecord>,
}

#[async_trait]
impl TrendSource for Fixed {
    async fn fetch_trends(&self) -> Vec<TrendRecord> {
        tokio::time::sleep(self.delay).await;
        self.items.clone()
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

struct Panicking;

#[async_trait]
impl TrendSource for Panicking {
    async fn fetch_trends(&self) -> Vec<TrendRecord> {
        panic!("adapter bypassed its own error handling");
    }
    fn name(&self) -> &'static str {
        "panicking"
    }
}

fn fixed(name: &'static str, items: Vec<TrendRecord>) -> Arc<dyn TrendSource> {
    Arc::new(Fixed {
        name,
        delay: Duration::ZERO,
        items,
    })
}

fn ids(v: &[TrendRecord]) -> Vec<&str> {
    v.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn merges_three_sources_by_score() {
    let sources = vec![
        fixed("reddit", vec![rec("r-1", 80)]),
        fixed("crypto", vec![rec("c-1", 95)]),
        fixed("news", vec![rec("n-1", 60)]),
    ];
    let out = ingest::fetch_all(&sources).await.unwrap();
    assert_eq!(ids(&out), vec!["c-1", "r-1", "n-1"]);
}

#[tokio::test]
async fn ties_keep_concatenation_order_regardless_of_finish_order() {
    // the first source finishes last; its tied record must still come first
    let sources: Vec<Arc<dyn TrendSource>> = vec![
        Arc::new(Fixed {
            name: "slow",
            delay: Duration::from_millis(30),
            items: vec![rec("a", 50), rec("b", 70)],
        }),
        fixed("fast", vec![rec("c", 50), rec("d", 70)]),
    ];
    let out = ingest::fetch_all(&sources).await.unwrap();
    assert_eq!(ids(&out), vec!["b", "d", "a", "c"]);
}

#[tokio::test]
async fn empty_source_contributes_nothing() {
    let sources = vec![
        fixed("reddit", vec![rec("r-1", 10), rec("r-2", 20)]),
        fixed("crypto", vec![]),
        fixed("news", vec![rec("n-1", 30)]),
    ];
    let out = ingest::fetch_all(&sources).await.unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(ids(&out), vec!["n-1", "r-2", "r-1"]);
}

#[tokio::test]
async fn pipeline_does_not_deduplicate() {
    let sources = vec![
        fixed("a", vec![rec("x-1", 10)]),
        fixed("b", vec![rec("x-1", 10)]),
    ];
    let out = ingest::fetch_all(&sources).await.unwrap();
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn aborted_source_fails_whole_fetch() {
    let sources: Vec<Arc<dyn TrendSource>> =
        vec![fixed("ok", vec![rec("r-1", 1)]), Arc::new(Panicking)];
    let err = ingest::fetch_all(&sources).await.unwrap_err();
    assert!(format!("{err:#}").contains("panicking"));
}

#[tokio::test]
async fn no_sources_is_empty_feed() {
    let out = ingest::fetch_all(&[]).await.unwrap();
    assert!(out.is_empty());
}
