// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::types::FeedDescriptor;

const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";
const ENV_POLL_INTERVAL: &str = "NEWS_POLL_INTERVAL_SECS";
const ENV_CACHE_CAPACITY: &str = "NEWS_CACHE_CAPACITY";
const ENV_FETCH_TIMEOUT: &str = "NEWS_FETCH_TIMEOUT_SECS";

/// Tunables of the polling core. All injectable; the defaults match the
/// production dashboard (5-minute refresh, 300 cached items).
#[derive(Clone, Copy, Debug)]
pub struct IngestConfig {
    pub interval_secs: u64,
    pub cache_capacity: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5 * 60,
            cache_capacity: 300,
            fetch_timeout_secs: 30,
        }
    }
}

impl IngestConfig {
    /// Defaults overridden by environment variables where present.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            interval_secs: env_parse(ENV_POLL_INTERVAL).unwrap_or(d.interval_secs),
            cache_capacity: env_parse(ENV_CACHE_CAPACITY).unwrap_or(d.cache_capacity),
            fetch_timeout_secs: env_parse(ENV_FETCH_TIMEOUT).unwrap_or(d.fetch_timeout_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Load the feed list from an explicit path. Supports TOML or JSON.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed list using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) the built-in default list
pub fn load_feeds_default() -> Result<Vec<FeedDescriptor>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(default_feeds())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedDescriptor>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try a JSON array of {name, url}
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed list format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedDescriptor>> {
    #[derive(serde::Deserialize)]
    struct TomlFeeds {
        feeds: Vec<FeedDescriptor>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<FeedDescriptor>> {
    let v: Vec<FeedDescriptor> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Drop blank entries and duplicate URLs, preserving file order.
fn clean_list(feeds: Vec<FeedDescriptor>) -> Vec<FeedDescriptor> {
    let mut seen_urls = HashSet::new();
    let mut out = Vec::with_capacity(feeds.len());
    for f in feeds {
        let name = f.name.trim();
        let url = f.url.trim();
        if name.is_empty() || url.is_empty() || !seen_urls.insert(url.to_string()) {
            continue;
        }
        out.push(FeedDescriptor {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    out
}

/// The stock crypto news sources polled when no feed list is configured.
pub fn default_feeds() -> Vec<FeedDescriptor> {
    [
        ("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/"),
        ("CoinTelegraph", "https://cointelegraph.com/rss"),
        ("Bitcoin.com", "https://news.bitcoin.com/feed/"),
        ("Decrypt", "https://decrypt.co/feed"),
        ("CryptoSlate", "https://cryptoslate.com/feed/"),
        ("Bitcoinist", "https://bitcoinist.com/feed/"),
        ("NewsBTC", "https://www.newsbtc.com/feed/"),
        ("BeInCrypto", "https://beincrypto.com/feed/"),
        ("CryptoPotato", "https://cryptopotato.com/feed/"),
        ("CoinGape", "https://coingape.com/feed/"),
        ("UToday", "https://u.today/rss"),
        ("Blockworks", "https://blockworks.co/feed"),
        ("The Block", "https://www.theblockcrypto.com/rss.xml"),
        ("CryptoBriefing", "https://cryptobriefing.com/feed/"),
    ]
    .into_iter()
    .map(|(name, url)| FeedDescriptor {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}
