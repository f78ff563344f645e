// src/ingest/mod.rs
pub mod config;
pub mod normalize;
pub mod providers;
pub mod scheduler;
pub mod types;

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::types::{FeedSource, NewsItem};
use crate::state::NewsState;
use crate::stats::{compute_stats, AggregateStats};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_runs_total", "Completed poll cycles.");
        describe_counter!("ingest_events_total", "Total entries parsed from feeds.");
        describe_counter!(
            "ingest_new_total",
            "Items newly admitted to the cache after dedup."
        );
        describe_counter!("ingest_dup_total", "Items dropped as already-known ids.");
        describe_counter!("ingest_untitled_total", "Items discarded for missing titles.");
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse failures.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_cache_size", "Items currently cached.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when the last poll cycle ran.");
    });
}

/// Outcome of one fetch-merge-aggregate-notify pass.
#[derive(Debug)]
pub struct CycleReport {
    pub new_items: Vec<NewsItem>,
    pub stats: AggregateStats,
    pub feeds_ok: usize,
    pub feeds_failed: usize,
}

/// Run one complete poll cycle against the owned state.
///
/// Every configured source is fetched concurrently; a failing feed
/// contributes nothing and never aborts its siblings. The cache merge drops
/// untitled items and already-known ids, evicts past capacity, and the
/// stats are recomputed unconditionally: even an all-duplicate cycle
/// refreshes `generated_at` and reflects any truncation. Subscribers are
/// notified last. This function does not fail outward.
pub async fn poll_once(state: &NewsState, sources: &[Box<dyn FeedSource>]) -> CycleReport {
    ensure_metrics_described();

    let fetches = sources.iter().map(|s| async move {
        let outcome = s.fetch_latest().await;
        (s.name().to_string(), outcome)
    });

    let mut flat: Vec<NewsItem> = Vec::new();
    let mut feeds_ok = 0usize;
    let mut feeds_failed = 0usize;
    for (name, outcome) in join_all(fetches).await {
        match outcome {
            Ok(mut items) => {
                feeds_ok += 1;
                flat.append(&mut items);
            }
            Err(e) => {
                feeds_failed += 1;
                tracing::warn!(error = ?e, feed = %name, "feed error");
                counter!("ingest_feed_errors_total").increment(1);
            }
        }
    }

    // Untitled entries never reach the cache.
    let before = flat.len();
    flat.retain(|item| !item.title.is_empty());
    let untitled = before - flat.len();

    let candidates = flat.len();
    let new_items = state.store().admit(flat);
    let duplicates = candidates - new_items.len();

    let stats = compute_stats(&state.store().snapshot());
    state.replace_stats(stats.clone());

    state.events().publish_items(new_items.clone());
    state.events().publish_stats(stats.clone());

    // Telemetry
    counter!("ingest_runs_total").increment(1);
    counter!("ingest_new_total").increment(new_items.len() as u64);
    counter!("ingest_dup_total").increment(duplicates as u64);
    counter!("ingest_untitled_total").increment(untitled as u64);
    gauge!("ingest_cache_size").set(state.store().len() as f64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    CycleReport {
        new_items,
        stats,
        feeds_ok,
        feeds_failed,
    }
}
