//! API Handlers
//!
//! One handler per endpoint. Each maps the request onto a repository or
//! diagnostics call and returns JSON; errors leave through [`AppError`].

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::info;

use crate::db::{ItemStore, MemoryItemStore};
use crate::diagnostics;
use crate::error::{AppError, Result};
use crate::kv::{KvBackend, KvRepository, MemoryKv};
use crate::models::{
    CreateItemRequest, DbInfoResponse, DeletedItemResponse, HealthResponse, ItemResponse,
    ItemsResponse, KvListResponse, KvSetResponse, RedisInfoResponse, SetKeyRequest,
    SuccessResponse,
};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Application state shared across all handlers.
///
/// Holds the relational store and the key-value repository; both are
/// cheap to clone handles onto long-lived sessions.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemStore>,
    pub kv: KvRepository,
}

impl AppState {
    pub fn new(items: Arc<dyn ItemStore>, kv: Arc<dyn KvBackend>) -> Self {
        Self {
            items,
            kv: KvRepository::new(kv),
        }
    }

    /// State backed by process-local stores, for tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryItemStore::new()), Arc::new(MemoryKv::new()))
    }
}

/// Handler for GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Items ==

/// Handler for GET /items
pub async fn list_items_handler(State(state): State<AppState>) -> Result<Json<ItemsResponse>> {
    let items = state.items.list().await?;
    Ok(Json(ItemsResponse { items }))
}

/// Handler for POST /items
pub async fn create_item_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<Json<ItemResponse>> {
    let Json(req) = payload?;

    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let item = state.items.create(req.into_new_item()).await?;
    info!("Created item {}", item.id);

    Ok(Json(ItemResponse { item }))
}

/// Handler for DELETE /items/:id
///
/// Returns 404 when no row had the id.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<DeletedItemResponse>> {
    let Path(id) = path?;
    let id: i32 = id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidRequest("Invalid item id".to_string()))?;

    let deleted = state
        .items
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
    info!("Deleted item {}", id);

    Ok(Json(DeletedItemResponse::new(deleted)))
}

// == Key-Value ==

/// Handler for GET /redis
pub async fn list_keys_handler(State(state): State<AppState>) -> Result<Json<KvListResponse>> {
    let items = state.kv.list().await?;
    Ok(Json(KvListResponse { items }))
}

/// Handler for POST /redis
pub async fn set_key_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetKeyRequest>, JsonRejection>,
) -> Result<Json<KvSetResponse>> {
    let Json(req) = payload?;

    let (key, value) = state.kv.set(&req.key, &req.value, req.ttl).await?;

    Ok(Json(KvSetResponse::new(key, value)))
}

/// Handler for DELETE /redis/:key
///
/// The router has already percent-decoded the key.
pub async fn delete_key_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse>> {
    let Path(key) = path?;
    state.kv.delete(&key).await?;
    Ok(Json(SuccessResponse::ok()))
}

// == Diagnostics ==

/// Handler for GET /db-info
pub async fn db_info_handler(State(state): State<AppState>) -> (StatusCode, Json<DbInfoResponse>) {
    let report = diagnostics::database_report(state.items.as_ref()).await;
    (report_status(report.connected), Json(report))
}

/// Handler for GET /redis-info
pub async fn redis_info_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<RedisInfoResponse>) {
    let report = diagnostics::redis_report(state.kv.backend()).await;
    (report_status(report.connected), Json(report))
}

fn report_status(connected: bool) -> StatusCode {
    if connected {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
