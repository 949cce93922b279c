//! Persistent local storage for the session record.
//!
//! The store is a flat string map with a fixed set of keys, the same shape a
//! browser's local storage gives a single-page client. Exactly one session
//! record exists per store; writing a new one overwrites the old.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

/// Keys under which the session record is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The raw identity token. Its absence means logged out.
    Token,
    /// The signed-in user's email.
    Email,
    /// The signed-in user's display name.
    Name,
    /// The signed-in user's picture URL.
    Picture,
}

impl StorageKey {
    /// Every key that belongs to the session record.
    pub const ALL: [StorageKey; 4] = [Self::Token, Self::Email, Self::Name, Self::Picture];

    /// Returns the storage key name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "googleToken",
            Self::Email => "userEmail",
            Self::Name => "userName",
            Self::Picture => "userPicture",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Injectable session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads a key, returning `None` when it is not set.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError>;

    /// Writes a key, replacing any previous value.
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError>;

    /// Removes every session key. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store, used in tests and for one-shot invocations.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<StorageKey, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StorageKey, String>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::Io {
            reason: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(&key).cloned())
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key, value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries()?.clear();
        Ok(())
    }
}

/// Store backed by a JSON object in a file.
///
/// The file maps key names (`googleToken`, ...) to strings. A missing file is
/// an empty store; clearing deletes the file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store that reads and writes `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    reason: format!("{}: {e}", self.path.display()),
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            reason: format!("{}: {e}", self.path.display()),
        })
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let io_err = |e: std::io::Error| StoreError::Io {
            reason: format!("{}: {e}", self.path.display()),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(map).map_err(|e| StoreError::Corrupt {
            reason: e.to_string(),
        })?;
        tokio::fs::write(&self.path, json).await.map_err(io_err)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self.read_map().await?.remove(key.as_str()))
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking a fresh sign-in.
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StoreError::Corrupt { .. }) => HashMap::new(),
            Err(e) => return Err(e),
        };
        map.insert(key.as_str().to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                reason: format!("{}: {e}", self.path.display()),
            }),
        }
    }
}
