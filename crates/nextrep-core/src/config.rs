//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base URL, where the session token is kept, and the last used username.
//!
//! Configuration is stored at `~/.config/nextrep/config.json`. The
//! `NEXTREP_API_BASE_URL` and `NEXTREP_SESSION_BACKEND` environment
//! variables take precedence over the file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "nextrep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub const BASE_URL_ENV: &str = "NEXTREP_API_BASE_URL";
pub const SESSION_BACKEND_ENV: &str = "NEXTREP_SESSION_BACKEND";

/// Where the session token is kept between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl fmt::Display for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionBackend::File => "file",
            SessionBackend::Keyring => "keyring",
            SessionBackend::Memory => "memory",
        })
    }
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "keyring" => Ok(SessionBackend::Keyring),
            "memory" => Ok(SessionBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown session backend '{}' (expected file, keyring or memory)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub session_backend: Option<SessionBackend>,
    pub last_username: Option<String>,
    /// Overall per-request timeout; unset means the transport default
    pub request_timeout_secs: Option<u64>,
    /// Base URL given on the command line; never saved
    #[serde(skip)]
    pub base_url_override: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL: command line, then environment, then config file, then
    /// the local default
    pub fn api_base_url(&self) -> String {
        self.base_url_override
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn session_backend(&self) -> Result<SessionBackend> {
        match std::env::var(SESSION_BACKEND_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(self.session_backend.unwrap_or_default()),
        }
    }

    /// Open the configured session store
    pub fn open_session_store(&self) -> Result<Arc<dyn SessionStore>> {
        let backend = self.session_backend()?;
        debug!(backend = %backend, "Opening session store");
        let store: Arc<dyn SessionStore> = match backend {
            SessionBackend::File => Arc::new(FileSessionStore::open(self.cache_dir()?)?),
            SessionBackend::Keyring => Arc::new(KeyringSessionStore::open()?),
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.session_backend.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: Some("https://api.nextrep.test".to_string()),
            session_backend: Some(SessionBackend::Keyring),
            last_username: Some("ada".to_string()),
            request_timeout_secs: Some(15),
            base_url_override: Some("http://not-saved.test".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://api.nextrep.test"));
        assert_eq!(loaded.session_backend, Some(SessionBackend::Keyring));
        assert_eq!(loaded.request_timeout_secs, Some(15));
        assert!(loaded.base_url_override.is_none());
    }

    #[test]
    fn test_override_wins() {
        let config = Config {
            base_url: Some("https://from-file.test".to_string()),
            base_url_override: Some("https://from-flag.test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_base_url(), "https://from-flag.test");
    }

    #[test]
    fn test_backend_names() {
        let config: Config = serde_json::from_str(r#"{"session_backend": "memory"}"#).unwrap();
        assert_eq!(config.session_backend, Some(SessionBackend::Memory));
        assert_eq!("FILE".parse::<SessionBackend>().unwrap(), SessionBackend::File);
        assert!("cookie".parse::<SessionBackend>().is_err());
    }

    #[test]
    fn test_corrupt_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "base_url = 1").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
