//! REST API Server for the investment agent
//!
//! Exposes the agent as a server-sent event stream.
//! Every chat request gets a well-formed stream, whatever its body.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};

use crate::agent::InvestmentAgent;
use crate::relay::relay;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Default, Deserialize)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<InvestmentAgent>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_message(
    State(state): State<ApiState>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4();

    let message = match payload {
        Ok(Json(req)) => req.message.unwrap_or_default(),
        Err(rejection) => {
            warn!(%request_id, error = %rejection, "Unreadable chat body, treating as empty");
            String::new()
        }
    };

    let span = info_span!("chat_message", %request_id);
    let response = state
        .agent
        .execute(&message)
        .instrument(span)
        .await;

    info!(%request_id, outcome = ?response.outcome, "Streaming response");

    let events = relay(response.tokens)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.data())));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(events),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<InvestmentAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/chat/message", post(chat_message))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<InvestmentAgent>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
