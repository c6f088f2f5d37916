//! Session management for authenticated requests.
//!
//! This module provides:
//! - `SessionStore`: where the bearer token lives (memory, file, or keychain)
//! - `SessionEvents`: listeners notified when the server rejects the token
//!
//! Tokens do not expire locally; the server decides, and a 401 clears the
//! store.

pub mod credentials;
pub mod events;
pub mod session;

pub use credentials::KeyringSessionStore;
pub use events::{ListenerId, SessionEvents};
pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};
