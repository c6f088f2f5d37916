//! Nextrep client core.
//!
//! - `api`: the request pipeline (`ApiClient::request`) and typed endpoints
//! - `auth`: session token storage and session-expired notifications
//! - `models`: canonical response schemas
//! - `config`: base URL and session backend configuration
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use nextrep_core::{ApiClient, MemorySessionStore, PostQuery};
//!
//! let api = ApiClient::new("http://localhost:3000", Arc::new(MemorySessionStore::new()))?;
//! api.on_session_expired(|| eprintln!("Session expired, log in again"));
//! api.login("ada", "hunter2").await?;
//! let posts = api.list_posts(&PostQuery::default()).await?;
//! # let _ = posts;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiResponse, FileUpload, FormData, Payload, RequestOptions};
pub use auth::{
    FileSessionStore, KeyringSessionStore, ListenerId, MemorySessionStore, SessionEvents,
    SessionStore,
};
pub use config::{Config, SessionBackend};
pub use models::{
    Asset, Attachment, NewPost, Post, PostQuery, Profile, ProfileSummary, Reply, ReplyThread,
    SortOrder, User, Visibility,
};
