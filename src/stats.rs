//! # Aggregation Engine
//! Pure recomputation of dashboard statistics from the full cache contents:
//! trending terms, per-category and per-source counts, and an hourly
//! publication histogram. No incremental state; every poll cycle replaces
//! the previous value wholesale.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local, Timelike, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ingest::types::NewsItem;

/// How many trending terms the dashboard shows.
const TRENDING_CAP: usize = 12;

/// Articles, conjunctions, and domain-generic words excluded from trending.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "is", "in", "on", "at", "to", "for", "of", "with",
        "by", "from", "as", "this", "that", "it", "are", "was", "be", "been", "has", "have",
        "will", "can", "news", "crypto", "cryptocurrency",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// The "meta" block pushed to clients next to the item list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Top terms by frequency, capped at 12.
    pub trending: Vec<TermCount>,
    /// Category tallies, sorted descending by count.
    pub categories: Vec<CategoryCount>,
    #[serde(rename = "sourceStats")]
    pub sources: HashMap<String, usize>,
    /// Publication counts bucketed by local hour-of-day.
    pub hours: [u64; 24],
    pub generated_at: DateTime<Utc>,
}

impl AggregateStats {
    /// Sensible empty state served before the first poll cycle completes.
    pub fn empty() -> Self {
        Self {
            trending: Vec::new(),
            categories: Vec::new(),
            sources: HashMap::new(),
            hours: [0; 24],
            generated_at: Utc::now(),
        }
    }
}

/// Lowercase alphabetic tokens of length >= 3.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    static RE_WORD: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = RE_WORD.get_or_init(|| regex::Regex::new(r"\b[a-z]{3,}\b").unwrap());
    re.find_iter(text).map(|m| m.as_str())
}

/// Recompute all aggregates from the cache contents at call time.
pub fn compute_stats(items: &[NewsItem]) -> AggregateStats {
    let mut word_freq: HashMap<String, usize> = HashMap::new();
    let mut category_freq: HashMap<String, usize> = HashMap::new();
    let mut sources: HashMap<String, usize> = HashMap::new();
    let mut hours = [0u64; 24];

    for item in items {
        *sources.entry(item.source.clone()).or_insert(0) += 1;

        for cat in &item.categories {
            *category_freq.entry(cat.clone()).or_insert(0) += 1;
        }

        let text = format!("{} {}", item.title, item.summary).to_lowercase();
        for word in tokenize(&text) {
            if !STOP_WORDS.contains(word) {
                *word_freq.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        if let Some(published) = item.published {
            let hour = published.with_timezone(&Local).hour() as usize;
            hours[hour] += 1;
        }
    }

    let mut trending: Vec<TermCount> = word_freq
        .into_iter()
        .map(|(word, count)| TermCount { word, count })
        .collect();
    trending.sort_by(|a, b| b.count.cmp(&a.count));
    trending.truncate(TRENDING_CAP);

    let mut categories: Vec<CategoryCount> = category_freq
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    AggregateStats {
        trending,
        categories,
        sources,
        hours,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Sentiment;

    fn item(source: &str, title: &str, summary: &str, categories: &[&str]) -> NewsItem {
        NewsItem {
            id: format!("{source}:{title}"),
            title: title.to_string(),
            link: String::new(),
            source: source.to_string(),
            published: None,
            summary: summary.to_string(),
            sentiment: Sentiment::Neutral,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn sources_and_categories_are_tallied() {
        let items = vec![
            item("CoinDesk", "one", "", &["defi", "nft"]),
            item("CoinDesk", "two", "", &["defi"]),
            item("Decrypt", "three", "", &[]),
        ];
        let stats = compute_stats(&items);

        assert_eq!(stats.sources.get("CoinDesk"), Some(&2));
        assert_eq!(stats.sources.get("Decrypt"), Some(&1));
        assert_eq!(stats.categories[0].category, "defi");
        assert_eq!(stats.categories[0].count, 2);
    }

    #[test]
    fn trending_excludes_stop_words_and_short_tokens() {
        let items = vec![
            item("A", "the bitcoin halving", "bitcoin up", &[]),
            item("B", "bitcoin news", "a big day", &[]),
        ];
        let stats = compute_stats(&items);

        assert_eq!(stats.trending[0].word, "bitcoin");
        assert_eq!(stats.trending[0].count, 3);
        assert!(stats.trending.iter().all(|t| t.word != "the"));
        assert!(stats.trending.iter().all(|t| t.word != "news"));
        assert!(stats.trending.iter().all(|t| t.word != "up")); // len < 3
    }

    #[test]
    fn trending_is_capped() {
        let mut items = Vec::new();
        for c in "abcdefghijklmnopqrst".chars() {
            items.push(item("A", &format!("word{c}{c} repeated", c = c), "", &[]));
        }
        let stats = compute_stats(&items);
        assert_eq!(stats.trending.len(), 12);
        // "repeated" occurs 20 times and must rank first.
        assert_eq!(stats.trending[0].word, "repeated");
    }

    #[test]
    fn undated_items_are_excluded_from_histogram() {
        let items = vec![item("A", "undated", "", &[])];
        let stats = compute_stats(&items);
        assert_eq!(stats.hours.iter().sum::<u64>(), 0);
    }

    #[test]
    fn dated_items_land_in_exactly_one_bucket() {
        let mut it = item("A", "dated", "", &[]);
        it.published = Some(Utc::now());
        let stats = compute_stats(&[it]);
        assert_eq!(stats.hours.iter().sum::<u64>(), 1);
    }

    #[test]
    fn empty_stats_have_empty_collections() {
        let stats = AggregateStats::empty();
        assert!(stats.trending.is_empty());
        assert!(stats.categories.is_empty());
        assert!(stats.sources.is_empty());
        assert_eq!(stats.hours, [0; 24]);
    }
}
