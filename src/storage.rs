//! Persistent key/value storage for the raw access token.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plays the role of browser local storage: string keys to string values that
//! survive restarts. The login flow is the only writer of the token key;
//! other readers decide "logged in" from its presence.
//!
//! `FileTokenStore` keeps every key in one JSON object and replaces the file
//! with a temp-file rename, so a crash mid-write leaves the old contents.
//! A corrupt file is reported by reads and overwritten by the next save.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{AuthConfig, DEFAULT_TOKEN_KEY};

const STORE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("no data directory available for token storage")]
    NoStateDir,
}

/// Single-key token persistence.
pub trait TokenStore: Send + Sync {
    /// Overwrite the stored token.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write does not complete.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Remove the stored token. Removing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be updated.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    key: String,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { entries: Arc::default(), key: key.into() }
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_KEY)
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.key.clone(), token.to_owned());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.key)
            .cloned())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-file store at `<dir>/storage.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl FileTokenStore {
    /// Store under `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn new(dir: &Path, key: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self { path: dir.join(STORE_FILE), key: key.into(), write_lock: Arc::default() })
    }

    /// Store in the configured state dir, falling back to the platform data dir.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoStateDir`] when neither is available.
    pub fn from_config(config: &AuthConfig) -> Result<Self, StorageError> {
        let dir = match &config.state_dir {
            Some(dir) => dir.clone(),
            None => default_state_dir().ok_or(StorageError::NoStateDir)?,
        };
        Self::new(&dir, config.token_key.clone())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing corrupt token storage");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(self.key.clone(), token.to_owned());
        self.write_entries(&entries)
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(&self.key))
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

fn default_state_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "authflow").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
