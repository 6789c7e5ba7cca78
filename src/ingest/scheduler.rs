// src/ingest/scheduler.rs
//! Refresh sequencer: one task owns the feed, accepts triggers (startup,
//! timer, manual) and applies only the result of the latest requested refresh.

use anyhow::{anyhow, Result};
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::ingest::types::TrendSource;
use crate::ingest::{ensure_metrics_described, fetch_all};
use crate::trend::TrendRecord;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const REFRESH_ERROR_MESSAGE: &str = "Failed to load trends. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Timer,
    Manual,
}

impl RefreshTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            RefreshTrigger::Startup => "startup",
            RefreshTrigger::Timer => "timer",
            RefreshTrigger::Manual => "manual",
        }
    }
}

/// Published view of the feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub status: RefreshStatus,
    pub trends: Vec<TrendRecord>,
    pub last_updated: Option<i64>, // epoch ms
    pub error: Option<String>,
    /// Latest sequence number issued.
    pub requested: u64,
    /// Sequence number whose result (success or failure) is shown.
    pub applied: u64,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            status: RefreshStatus::Idle,
            trends: Vec::new(),
            last_updated: None,
            error: None,
            requested: 0,
            applied: 0,
        }
    }
}

#[derive(Debug)]
struct Request {
    sequence: u64,
    trigger: RefreshTrigger,
}

type Outcome = (u64, Result<Vec<TrendRecord>>);

/// Cloneable front for triggering refreshes and reading the feed.
#[derive(Clone)]
pub struct SchedulerHandle {
    requests: mpsc::UnboundedSender<Request>,
    next_sequence: Arc<AtomicU64>,
    state: watch::Receiver<FeedSnapshot>,
}

impl SchedulerHandle {
    fn trigger(&self, trigger: RefreshTrigger) -> Result<u64> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .send(Request { sequence, trigger })
            .map_err(|_| anyhow!("refresh sequencer is not running"))?;
        Ok(sequence)
    }

    /// Manual refresh. Returns the sequence number assigned to it.
    pub fn refresh(&self) -> Result<u64> {
        self.trigger(RefreshTrigger::Manual)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.clone()
    }

    /// Resolve once the shown feed reflects `sequence` or something newer.
    pub async fn wait_for_sequence(&self, sequence: u64) -> Result<FeedSnapshot> {
        let mut rx = self.state.clone();
        let snap = rx
            .wait_for(|s| s.applied >= sequence)
            .await
            .map_err(|_| anyhow!("refresh sequencer stopped"))?;
        Ok(snap.clone())
    }
}

pub struct RefreshScheduler {
    handle: SchedulerHandle,
    sequencer: JoinHandle<()>,
    timer: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Start the sequencer and the periodic timer, and issue the startup refresh.
    pub fn spawn(sources: Vec<Arc<dyn TrendSource>>, period: Duration) -> Result<Self> {
        ensure_metrics_described();
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(FeedSnapshot::default());

        let handle = SchedulerHandle {
            requests: req_tx,
            next_sequence: Arc::new(AtomicU64::new(0)),
            state: state_rx,
        };

        let sequencer = tokio::spawn(run_sequencer(Arc::from(sources), req_rx, state_tx));
        handle.trigger(RefreshTrigger::Startup)?;

        let timer_handle = handle.clone();
        let timer = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if timer_handle.trigger(RefreshTrigger::Timer).is_err() {
                    break;
                }
            }
        });

        tracing::info!(target: "ingest", period_secs = period.as_secs(), "refresh scheduler started");
        Ok(Self {
            handle,
            sequencer,
            timer,
        })
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn shutdown(self) {
        self.timer.abort();
        self.sequencer.abort();
    }
}

async fn run_sequencer(
    sources: Arc<[Arc<dyn TrendSource>]>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    state: watch::Sender<FeedSnapshot>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Outcome>();
    let mut latest = 0u64;

    loop {
        tokio::select! {
            req = requests.recv() => {
                let Some(req) = req else { break };
                counter!("trends_refresh_total", "trigger" => req.trigger.as_str()).increment(1);
                if req.sequence < latest {
                    // a newer request overtook this one in the queue
                    counter!("trends_refresh_stale_total").increment(1);
                    continue;
                }
                latest = req.sequence;
                tracing::debug!(target: "ingest", sequence = latest, trigger = req.trigger.as_str(), "refresh requested");
                state.send_modify(|s| {
                    s.status = RefreshStatus::Loading;
                    s.error = None;
                    s.requested = latest;
                });

                let sources = Arc::clone(&sources);
                let done = done_tx.clone();
                let sequence = req.sequence;
                tokio::spawn(async move {
                    let result = fetch_all(&sources).await;
                    let _ = done.send((sequence, result));
                });
            }
            Some((sequence, result)) = done_rx.recv() => {
                if sequence != latest {
                    tracing::debug!(target: "ingest", sequence, latest, "discarding stale refresh result");
                    counter!("trends_refresh_stale_total").increment(1);
                    continue;
                }
                apply(&state, sequence, result);
            }
        }
    }
}

fn apply(state: &watch::Sender<FeedSnapshot>, sequence: u64, result: Result<Vec<TrendRecord>>) {
    match result {
        Ok(trends) => {
            let now = chrono::Utc::now();
            tracing::info!(target: "ingest", sequence, count = trends.len(), "feed refreshed");
            gauge!("trends_last_refresh_ts").set(now.timestamp() as f64);
            state.send_modify(|s| {
                s.status = RefreshStatus::Ready;
                s.trends = trends;
                s.last_updated = Some(now.timestamp_millis());
                s.error = None;
                s.applied = sequence;
            });
        }
        Err(e) => {
            tracing::warn!(target: "ingest", error = ?e, sequence, "refresh failed; keeping previous feed");
            counter!("trends_refresh_errors_total").increment(1);
            state.send_modify(|s| {
                s.status = RefreshStatus::Error;
                s.error = Some(REFRESH_ERROR_MESSAGE.to_string());
                s.applied = sequence;
            });
        }
    }
}
