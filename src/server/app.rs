use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::github::CommitOrchestrator;
use crate::llm::ChatClient;
use crate::server::{chat, setup};

pub const SERVICE_NAME: &str = "foliod";

/// Shared per-process state. Everything request-scoped lives on the stack of
/// its handler; this only carries configuration and the two outbound clients
/// behind their trait seams.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat_client: Arc<dyn ChatClient>,
    pub orchestrator: Arc<CommitOrchestrator>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat::handle_chat))
        .route("/setup", post(setup::handle_setup))
        .fallback(fallback)
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, service = SERVICE_NAME, "HTTP server listening");
    axum::serve(listener, build_router(state)).await
}

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "now": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Bare OPTIONS (no preflight headers) gets the permissive 204; anything else
/// unmatched is a JSON 404. Real CORS preflights are answered by the layer.
async fn fallback(method: Method) -> axum::response::Response {
    use axum::response::IntoResponse;

    if method == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-setup-key"),
        ]);

    match origin.parse::<HeaderValue>() {
        Ok(value) if origin != "*" => layer.allow_origin(value),
        _ => layer.allow_origin(Any),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_payload_shape() {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let payload = json!({ "ok": true, "service": SERVICE_NAME, "now": now });
        assert_eq!(payload["ok"], true);
        assert!(payload["now"].as_str().unwrap().ends_with('Z'));
    }
}
