use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod services;
pub mod state;
pub mod validation;

use crate::error::ApiError;
use crate::handlers::{ai, assets, brand_kits, quotes, render, system, templates, uploads};
use crate::state::AppState;

/// Build the full application router over `state`
pub fn app(state: AppState) -> Router {
    let renders = ServeDir::new(state.storage.dir()).not_found_service(system::not_found.into_service());
    let cors = cors_layer(&state.config.security.cors_origins);
    // room for the multipart framing around the largest accepted logo
    let upload_limit = state.config.storage.max_logo_bytes.saturating_add(64 * 1024);

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(auth_routes())
        .merge(quote_routes())
        .merge(asset_routes())
        .merge(template_routes())
        .route("/api/brand-kit", get(brand_kits::get).put(brand_kits::put))
        .route("/api/render", post(render::render))
        .route("/api/ai/rewrite", post(ai::rewrite))
        .route("/api/upload/logo", post(uploads::logo).layer(DefaultBodyLimit::max(upload_limit)))
        .nest_service("/renders", renders)
        .fallback(system::not_found)
        // Global middleware
        .layer(map_response(envelope_method_not_allowed))
        .layer(from_fn_with_state(state.clone(), crate::middleware::authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use crate::handlers::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/auth/me", get(auth::me))
}

fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quotes", get(quotes::list).post(quotes::create))
        .route("/api/quotes/random", get(quotes::random))
        .route("/api/quotes/categories", get(quotes::categories))
        .route("/api/quotes/:id", get(quotes::get).put(quotes::update).delete(quotes::delete))
        .route("/api/quotes/:id/like", post(quotes::like))
        .route("/api/quotes/:id/share", post(quotes::share))
}

fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/api/assets", get(assets::list))
        .route("/api/assets/:id", get(assets::get).delete(assets::delete))
}

fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(templates::list).post(templates::create))
        .route(
            "/api/templates/:id",
            get(templates::get).put(templates::update).delete(templates::delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}

/// Method routing answers a known path with an empty 405; give it an envelope
async fn envelope_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = ApiError::method_not_allowed().into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal(detail).into_response()
}
