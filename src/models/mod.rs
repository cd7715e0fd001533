//! Request and Response models for the probe API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreateItemRequest, SetKeyRequest};
pub use responses::{
    DbInfoResponse, DeletedItemResponse, ErrorResponse, HealthResponse, ItemResponse,
    ItemsResponse, KvListResponse, KvSetResponse, RedisInfoResponse, SuccessResponse,
};
