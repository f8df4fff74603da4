//! HTTP relay between the export pipeline and the automation webhook.
//!
//! `POST /api/zapier` forwards the request body unchanged to the configured
//! hook and answers `{"success": true}` when the hook accepts it.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info};

use crate::error::Result;

pub const RELAY_PATH: &str = "/api/zapier";

#[derive(Clone)]
struct RelayState {
    hook_url: Option<String>,
    client: reqwest::Client,
}

pub fn router(hook_url: Option<String>) -> Router {
    let state = RelayState {
        hook_url,
        client: reqwest::Client::new(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(RELAY_PATH, post(forward).options(preflight))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the relay until the listener fails.
pub async fn serve(listener: TcpListener, hook_url: Option<String>) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, path = RELAY_PATH, "relay listening");
    }
    axum::serve(listener, router(hook_url)).await?;
    Ok(())
}

async fn preflight() -> impl IntoResponse {
    Json(json!({}))
}

fn relay_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

async fn forward(State(state): State<RelayState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let Some(hook_url) = state.hook_url.as_deref() else {
        error!("webhook URL not configured");
        return relay_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Zapier webhook URL not configured",
        );
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "unreadable relay request body");
            return relay_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process request");
        }
    };

    info!(
        video_title = payload["videoTitle"].as_str().unwrap_or_default(),
        video_url = payload["videoUrl"].as_str().unwrap_or_default(),
        note_count = payload["notes"].as_array().map(Vec::len).unwrap_or(0),
        "relaying export to webhook"
    );

    let response = match state.client.post(hook_url).json(&payload).send().await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "webhook request failed");
            return relay_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process request");
        }
    };

    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    debug!(status, body = %text, "webhook response");

    if !(200..300).contains(&status) {
        error!(status, body = %text, "webhook rejected export");
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        return relay_error(
            status,
            format!("Zapier responded with status: {}", status.as_u16()),
        );
    }

    info!("export relayed to webhook");
    (StatusCode::OK, Json(json!({ "success": true })))
}
