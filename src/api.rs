//! Thin HTTP/WebSocket transport over the aggregation core.
//!
//! The handlers relay the core's pull snapshots and push events verbatim;
//! no aggregation logic lives here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;

use crate::state::NewsState;
use crate::subscribe::NewsEvent;

#[derive(Clone)]
pub struct AppState {
    news: Arc<NewsState>,
}

pub fn create_router(news: Arc<NewsState>) -> Router {
    let state = AppState { news };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(news_index))
        .route("/api/summary", get(item_summary))
        .route("/ws", get(ws_upgrade))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Current cache (published-descending) plus the latest stats.
async fn news_index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "news": state.news.current_items(),
        "meta": state.news.current_stats(),
    }))
}

/// Naive extractive summary: title plus the first 160 chars of the summary.
async fn item_summary(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(id) = q.get("id").filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "id required" })));
    };

    let Some(item) = state
        .news
        .current_items()
        .into_iter()
        .find(|n| &n.id == id)
    else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })));
    };

    let truncated: String = item.summary.chars().take(160).collect();
    let ellipsis = if item.summary.chars().count() > 160 {
        "…"
    } else {
        ""
    };
    let summary = format!("{} - {}{}", item.title, truncated, ellipsis);

    (StatusCode::OK, Json(json!({ "id": id, "summary": summary })))
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_events(socket, state))
}

/// Send the current cache immediately, then relay push events until either
/// side goes away. A lagging client silently loses the missed events; the
/// pull endpoint is its consistency fallback.
async fn relay_events(mut socket: WebSocket, state: AppState) {
    let mut rx = state.news.subscribe();

    let init = json!({
        "type": "init",
        "payload": {
            "news": state.news.current_items(),
            "meta": state.news.current_stats(),
        },
    });
    if socket.send(Message::Text(init.to_string().into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                let frame = match event {
                    Ok(NewsEvent::Items(items)) => json!({ "type": "news", "payload": items }),
                    Ok(NewsEvent::Stats(stats)) => json!({ "type": "meta", "payload": stats }),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                };
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    // Inbound client frames carry no meaning here.
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
        }
    }
}
