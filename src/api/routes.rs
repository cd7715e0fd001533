//! API Routes
//!
//! Configures the Axum router with all probe endpoints.

use axum::{
    http::{header, HeaderValue},
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers::{
    create_item_handler, db_info_handler, delete_item_handler, delete_key_handler,
    health_handler, index_handler, list_items_handler, list_keys_handler, redis_info_handler,
    set_key_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Browser page
/// - `GET /health` - Process liveness
/// - `GET|POST /items` - List or create items
/// - `DELETE /items/:id` - Delete an item
/// - `GET|POST /redis` - List or set namespaced keys
/// - `DELETE /redis/:key` - Delete a namespaced key
/// - `GET /db-info` - Postgres diagnostics
/// - `GET /redis-info` - Redis diagnostics
///
/// # Middleware
/// - No-cache headers on every response, so intermediaries never serve stale state
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route("/items/:id", delete(delete_item_handler))
        .route("/redis", get(list_keys_handler).post(set_key_handler))
        .route("/redis/:key", delete(delete_key_handler))
        .route("/db-info", get(db_info_handler))
        .route("/redis-info", get(redis_info_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
