//! # Enrichment Engine
//! Pure keyword heuristics that map raw item text to a market-sentiment
//! label and a set of topic categories. No state, no I/O, no failure mode.
//!
//! The keyword tables are data, not code: they live in
//! `config/enrichment.json` and are embedded at compile time so they can be
//! swapped without touching control flow.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct EnrichmentTables {
    positive: Vec<String>,
    negative: Vec<String>,
    categories: BTreeMap<String, Vec<String>>,
}

static TABLES: Lazy<EnrichmentTables> = Lazy::new(|| {
    let raw = include_str!("../config/enrichment.json");
    serde_json::from_str::<EnrichmentTables>(raw).expect("valid enrichment tables")
});

/// Derived market polarity of one item's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// Score = positive keyword hits minus negative keyword hits, each keyword
/// counted once per text (presence test, not frequency).
pub fn sentiment_of(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let pos = TABLES
        .positive
        .iter()
        .filter(|k| lower.contains(k.as_str()))
        .count() as i32;
    let neg = TABLES
        .negative
        .iter()
        .filter(|k| lower.contains(k.as_str()))
        .count() as i32;

    match pos - neg {
        s if s > 0 => Sentiment::Bullish,
        s if s < 0 => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    }
}

/// A category applies when any of its keywords occurs as a case-insensitive
/// substring. A text may match zero, one, or many categories.
pub fn categories_of(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TABLES
        .categories
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
        .map(|(cat, _)| cat.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_on_rally_and_adoption() {
        assert_eq!(
            sentiment_of("Bitcoin rallies on institutional adoption"),
            Sentiment::Bullish
        );
    }

    #[test]
    fn bearish_on_hack_and_exploit() {
        assert_eq!(
            sentiment_of("Exchange hacked, funds drained in exploit"),
            Sentiment::Bearish
        );
    }

    #[test]
    fn neutral_without_keyword_hits() {
        assert_eq!(sentiment_of("Market holds steady"), Sentiment::Neutral);
    }

    #[test]
    fn keyword_presence_counts_once() {
        // "rally rally rally" is one positive hit, so a single negative
        // keyword cancels it to neutral.
        assert_eq!(
            sentiment_of("rally rally rally meets lawsuit"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn categories_allow_multi_membership() {
        let cats = categories_of("SEC reviews NFT marketplace rules");
        assert!(cats.iter().any(|c| c == "regulation"));
        assert!(cats.iter().any(|c| c == "nft"));
    }

    #[test]
    fn categories_empty_without_matches() {
        assert!(categories_of("Quiet weekend for markets").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(sentiment_of("BULLISH BREAKOUT"), Sentiment::Bullish);
        assert_eq!(categories_of("COINBASE LISTING"), vec!["exchange"]);
    }
}
