use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::AppError;
use crate::models::ChatRequest;
use crate::service::chat_service::ChatService;

/// GET `/` — liveness
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "the API is on" }))
}

/// GET `/api/health`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET `/api/products` — the catalog as loaded, or `[]`
pub async fn products_handler(State(svc): State<ChatService>) -> Json<Vec<Value>> {
    Json(svc.get_products().await)
}

/// POST `/api/chat` — relays the conversation and streams the reply as SSE.
/// Failures before the backend answers, a malformed body included, produce a
/// single JSON error object.
pub async fn chat_handler(
    State(svc): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("Rejected chat request: {rejection}");
            return AppError::from(rejection).into_response();
        }
    };

    // Relay failures are logged where they happen.
    match svc.relay(request.messages).await {
        Ok(events) => Sse::new(events.map(|event| Event::default().json_data(event))).into_response(),
        Err(e) => e.into_response(),
    }
}
