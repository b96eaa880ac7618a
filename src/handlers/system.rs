use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Viral Quote Engine API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Quotes, templates, brand kits and rendered assets for shareable quote images",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth/login, /api/auth/verify, /api/auth/me",
            "quotes": "/api/quotes[/:id], /api/quotes/random, /api/quotes/categories, /api/quotes/:id/like|share",
            "assets": "/api/assets[/:id]",
            "templates": "/api/templates[/:id]",
            "brandKit": "/api/brand-kit",
            "render": "/api/render",
            "ai": "/api/ai/rewrite",
            "upload": "/api/upload/logo",
            "renders": "/renders/*",
        }
    })))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let store = state.quotes.backend();
    if let Err(e) = state.ping().await {
        tracing::error!("Health check failed for {} store: {}", store, e);
        return Err(ApiError::ServiceUnavailable(format!("{} store unavailable", store)));
    }
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "store": store,
    })))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
