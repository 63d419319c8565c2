// handlers/public/root.rs - service info and health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - Service name, version and endpoint map
pub async fn index() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "user": ["/user/create", "/user/token", "/user/token/refresh", "/user/me"],
            "recipe": ["/recipe/tags", "/recipe/ingredients", "/recipe/recipes"]
        }
    }))
}

/// GET /health - Storage connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "database": "disconnected" })),
            )
        }
    }
}
