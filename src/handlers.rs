use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive};
use axum::response::Sse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::error::*;
use crate::init::AppState;

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat/stream", post(chat_stream_handler))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// SSE STREAM HANDLER
// ============================================================================

/// Handler for streaming repair guides via SSE
///
/// POST /chat/stream
/// Body: {"query": "iPhone 12 screen"}
///
/// Returns: Server-Sent Events stream, one `data:` event per progress chunk
pub async fn chat_stream_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let Json(request) = payload
        .map_err(|e| AppError::bad_request(e.body_text()))
        .inspect_err(log_error)?;

    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Query is required"))
        .inspect_err(log_error)?;

    let mut rx = state.agent.handle_request_stream(query);

    let stream = async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            let terminal = chunk.is_terminal();
            yield Ok::<_, Infallible>(Event::default().data(chunk.text()));

            if terminal {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.keep_alive)
            .text("keep-alive"),
    ))
}
