// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ingest::poll_once;
use crate::ingest::types::FeedSource;
use crate::state::NewsState;

/// Handle to the recurring poll trigger. Stopping it cancels future ticks
/// only; a cycle already in flight runs to completion in its own task.
#[derive(Debug)]
pub struct PollLoopHandle {
    task: JoinHandle<()>,
}

impl PollLoopHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the recurring poll loop: one cycle immediately, then one per
/// `interval`, indefinitely until the handle is stopped.
///
/// Each cycle runs as its own task. A cycle slower than the interval may
/// therefore overlap the next one; the cache merge tolerates that (dedup is
/// id-based and the stats swap is atomic), and the next cycle picks up
/// whatever the slow one missed.
pub fn spawn_poll_loop(
    state: Arc<NewsState>,
    sources: Arc<Vec<Box<dyn FeedSource>>>,
    interval: Duration,
) -> PollLoopHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let state = Arc::clone(&state);
            let sources = Arc::clone(&sources);
            tokio::spawn(async move {
                let report = poll_once(&state, &sources).await;
                tracing::info!(
                    target: "ingest",
                    new = report.new_items.len(),
                    cached = state.store().len(),
                    feeds_ok = report.feeds_ok,
                    feeds_failed = report.feeds_failed,
                    "poll cycle"
                );
            });
        }
    });

    PollLoopHandle { task }
}
