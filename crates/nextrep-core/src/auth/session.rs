use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Storage for the bearer token. Read before every request, written on
/// login/signup, cleared on logout or when the server rejects the token.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves plain data behind; keep using it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Session that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        lock(&self.token).clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *lock(&self.token) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.token) = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}

/// Session persisted as JSON in the cache directory.
pub struct FileSessionStore {
    cache_dir: PathBuf,
    data: Mutex<Option<SessionData>>,
}

impl FileSessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: Mutex::new(None),
        }
    }

    /// Open the store and load any saved session.
    pub fn open(cache_dir: PathBuf) -> Result<Self> {
        let store = Self::new(cache_dir);
        store.load()?;
        Ok(store)
    }

    /// Load session from disk
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        *lock(&self.data) = Some(data);
        Ok(true)
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        lock(&self.data).as_ref().map(|d| d.token.clone())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let data = SessionData::new(token);
        *lock(&self.data) = Some(data.clone());
        self.save(&data)
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.data) = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemorySessionStore::new();
        assert!(!store.is_authenticated());

        store.set_token("abc").unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_memory_stores_are_independent() {
        let a = MemorySessionStore::with_token("a");
        let b = MemorySessionStore::new();
        assert!(a.is_authenticated());
        assert!(!b.is_authenticated());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileSessionStore::new(dir.path().to_path_buf());
        store.set_token("persisted").unwrap();

        let reopened = FileSessionStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        store.set_token("gone-soon").unwrap();
        assert!(dir.path().join(SESSION_FILE).exists());

        store.clear().unwrap();
        assert!(!dir.path().join(SESSION_FILE).exists());
        assert!(!store.is_authenticated());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing"));
        assert!(!store.load().unwrap());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_file_store_reads_older_session_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SESSION_FILE),
            r#"{"token": "old", "username": "ada", "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let store = FileSessionStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.token().as_deref(), Some("old"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(FileSessionStore::open(dir.path().to_path_buf()).is_err());
    }
}
