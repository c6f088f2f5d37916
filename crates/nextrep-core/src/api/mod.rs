//! REST API client module for the Nextrep backend.
//!
//! This module provides the `ApiClient` and its request pipeline, plus one
//! typed method per backend endpoint (see `endpoints`).
//!
//! The API uses bearer token authentication; callers without a session are
//! marked with `user_id=-1` as the backend expects.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiResponse, FileUpload, FormData, FormPart, Payload, RequestOptions};
