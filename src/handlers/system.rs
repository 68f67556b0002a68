use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - Service name, version and endpoints
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "users": "/api/users[/:id]",
            "products": "/api/products[/:id]",
            "health": "/health",
        }
    }))
}

/// GET /health - 200 when storage answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.users.count().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "storage": state.backend,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable("Storage unavailable").into_response()
        }
    }
}
