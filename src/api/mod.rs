//! API Module
//!
//! HTTP handlers and routing for the probe REST API.
//!
//! # Endpoints
//! - `GET /items`, `POST /items`, `DELETE /items/:id` - Postgres items
//! - `GET /redis`, `POST /redis`, `DELETE /redis/:key` - Namespaced Redis keys
//! - `GET /db-info`, `GET /redis-info` - Store diagnostics
//! - `GET /health` - Health check endpoint
//! - `GET /` - Browser page

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
