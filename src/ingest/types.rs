// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::enrich::Sentiment;

/// One configured feed: display name plus the RSS endpoint.
/// Static configuration, immutable for the process lifetime.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedDescriptor {
    pub name: String, // e.g., "CoinDesk", "Decrypt"
    pub url: String,
}

/// Canonical news item as held in the cache and pushed to clients.
///
/// Created once by the normalizer during a poll cycle and never updated in
/// place; `sentiment` and `categories` are fixed at normalization time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    /// Dedup key: feed-provided guid, else explicit id, else the link URL.
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    pub sentiment: Sentiment,
    pub categories: Vec<String>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &str;
}
