// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/news      (empty state and after a poll cycle)
// - GET /api/summary   (400 / 404 / 200)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use crypto_news_aggregator::{
    api, poll_once, FeedSource, NewsItem, NewsState, Sentiment,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_router(state: &Arc<NewsState>) -> Router {
    api::create_router(Arc::clone(state))
}

struct StaticSource(Vec<NewsItem>);

#[async_trait]
impl FeedSource for StaticSource {
    async fn fetch_latest(&self) -> Result<Vec<NewsItem>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "Static"
    }
}

fn item(id: &str, title: &str, summary: &str) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        link: format!("https://example.com/{id}"),
        source: "Static".into(),
        published: None,
        summary: summary.to_string(),
        sentiment: Sentiment::Neutral,
        categories: Vec::new(),
    }
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let state = Arc::new(NewsState::new(10));
    let app = test_router(&state);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn news_endpoint_serves_empty_defaults_before_first_cycle() {
    let state = Arc::new(NewsState::new(10));
    let (status, v) = get_json(test_router(&state), "/api/news").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["news"].as_array().map(Vec::len), Some(0));

    // Contract checks for UI consumers
    let meta = &v["meta"];
    assert!(meta.get("trending").is_some(), "missing 'trending'");
    assert!(meta.get("sourceStats").is_some(), "missing 'sourceStats'");
    assert!(meta.get("generatedAt").is_some(), "missing 'generatedAt'");
    assert_eq!(meta["hours"].as_array().map(Vec::len), Some(24));
}

#[tokio::test]
async fn news_endpoint_reflects_the_cache_after_a_cycle() {
    let state = Arc::new(NewsState::new(10));
    let srcs: Vec<Box<dyn FeedSource>> = vec![Box::new(StaticSource(vec![
        item("a", "Bitcoin adoption grows", "Merchants onboard"),
        item("b", "Quiet day", ""),
    ]))];
    poll_once(&state, &srcs).await;

    let (status, v) = get_json(test_router(&state), "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["news"].as_array().map(Vec::len), Some(2));
    assert_eq!(v["meta"]["sourceStats"]["Static"], 2);

    // Items serialize with their enrichment fields.
    let first = &v["news"][0];
    assert!(first.get("sentiment").is_some(), "missing 'sentiment'");
    assert!(first.get("categories").is_some(), "missing 'categories'");
}

#[tokio::test]
async fn summary_requires_an_id() {
    let state = Arc::new(NewsState::new(10));
    let (status, v) = get_json(test_router(&state), "/api/summary").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "id required");
}

#[tokio::test]
async fn summary_unknown_id_is_404() {
    let state = Arc::new(NewsState::new(10));
    let (status, v) = get_json(test_router(&state), "/api/summary?id=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "not found");
}

#[tokio::test]
async fn summary_is_title_plus_excerpt() {
    let state = Arc::new(NewsState::new(10));
    let srcs: Vec<Box<dyn FeedSource>> = vec![Box::new(StaticSource(vec![item(
        "long",
        "Headline",
        &"x".repeat(200),
    )]))];
    poll_once(&state, &srcs).await;

    let (status, v) = get_json(test_router(&state), "/api/summary?id=long").await;
    assert_eq!(status, StatusCode::OK);
    let summary = v["summary"].as_str().expect("summary string");
    assert!(summary.starts_with("Headline - "));
    assert!(summary.ends_with('…'));
    // Only the first 160 chars of the excerpt are kept.
    assert_eq!(summary.matches('x').count(), 160);
}
