use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

use super::SessionStore;

const SERVICE_NAME: &str = "nextrep";

/// Keychain account the session token is stored under
const SESSION_ACCOUNT: &str = "session-token";

/// Session token kept in the OS keychain. The token is read once and then
/// served from memory.
pub struct KeyringSessionStore {
    entry: Entry,
    cached: Mutex<Option<String>>,
}

impl KeyringSessionStore {
    pub fn open() -> Result<Self> {
        let entry =
            Entry::new(SERVICE_NAME, SESSION_ACCOUNT).context("Failed to create keyring entry")?;
        let cached = match entry.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                return Err(e).context("Failed to retrieve session token from keychain");
            }
        };
        Ok(Self {
            entry,
            cached: Mutex::new(cached),
        })
    }
}

impl SessionStore for KeyringSessionStore {
    fn token(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.entry
            .set_password(token)
            .context("Failed to store session token in keychain")?;
        *self.cached.lock().unwrap_or_else(|p| p.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.cached.lock().unwrap_or_else(|p| p.into_inner()) = None;
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                debug!(error = %e, "Keychain delete failed");
                Err(e).context("Failed to delete session token from keychain")
            }
        }
    }
}
