// src/ingest/normalize.rs
//
// Maps one raw feed entry plus its source name into the canonical
// `NewsItem`, invoking the enrichment heuristics. Field defaulting, never
// rejection: malformed dates become `None`, a missing summary becomes "".

use chrono::{DateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::enrich::{categories_of, sentiment_of};
use crate::ingest::types::NewsItem;

/// Raw entry fields as they come off the wire, all optional.
#[derive(Debug, Default, Clone)]
pub struct RawEntry {
    pub guid: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

/// Normalize text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Parse a feed timestamp. Feeds in the wild carry RFC 2822 (`pubDate`) or
/// RFC 3339; anything else is stored as a missing timestamp, not rejected.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let t = ts.trim();
    let parsed = OffsetDateTime::parse(t, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(t, &Rfc3339))
        .ok()?;
    DateTime::from_timestamp(parsed.to_offset(UtcOffset::UTC).unix_timestamp(), 0)
}

fn first_non_empty(candidates: [&Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build the canonical item. Identity resolution order: explicit guid, else
/// explicit id, else link. A missing title is tolerated here; the poll
/// cycle filters untitled items before they reach the cache.
pub fn normalize_entry(source: &str, raw: RawEntry) -> NewsItem {
    let title = normalize_text(raw.title.as_deref().unwrap_or_default());
    let summary = normalize_text(raw.description.as_deref().unwrap_or_default());
    let link = raw.link.as_deref().unwrap_or_default().trim().to_string();
    let id = first_non_empty([&raw.guid, &raw.id, &raw.link]).unwrap_or_default();

    let combined = format!("{} {}", title, summary);
    NewsItem {
        id,
        title,
        link,
        source: source.to_string(),
        published: raw.pub_date.as_deref().and_then(parse_timestamp),
        summary,
        sentiment: sentiment_of(&combined),
        categories: categories_of(&combined),
    }
}
