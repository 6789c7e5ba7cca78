// src/ingest/types.rs
use async_trait::async_trait;

use crate::trend::TrendRecord;

/// One upstream data source mapped into [`TrendRecord`]s.
///
/// Implementations swallow their own failures: a broken upstream yields an
/// empty vec, never an error.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch_trends(&self) -> Vec<TrendRecord>;
    fn name(&self) -> &'static str;
}
