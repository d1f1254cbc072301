//! Cookie-like persisted key/value storage with per-entry expiry.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store keeps the bearer token and the serialized user record
//! here so a later process can hydrate without logging in again. Entries
//! past their expiry read as absent, exactly like an expired cookie.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Errors produced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("storage document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A stored value and the instant it stops being readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl StoredEntry {
    #[must_use]
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// Persistence backend for session entries.
pub trait SessionStorage: Send + Sync {
    /// Raw entry for `key`, regardless of expiry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<StoredEntry>, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn store(&self, key: &str, entry: StoredEntry) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Value for `key` if present and unexpired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn get_live(&self, key: &str, now: OffsetDateTime) -> Result<Option<String>, StorageError> {
        Ok(self.load(key)?.filter(|entry| entry.is_live(now)).map(|entry| entry.value))
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<StoredEntry>, StorageError> {
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn store(&self, key: &str, entry: StoredEntry) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_owned(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// A single JSON document on disk holding every entry.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

type Document = HashMap<String, StoredEntry>;

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Document::new()),
            Err(source) => Err(StorageError::Io { path: self.path.clone(), source }),
        }
    }

    fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Document)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read_document()?;
        apply(&mut document);
        self.write_document(&document)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<StoredEntry>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_document()?.remove(key))
    }

    fn store(&self, key: &str, entry: StoredEntry) -> Result<(), StorageError> {
        self.update(|document| {
            document.insert(key.to_owned(), entry);
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|document| {
            document.remove(key);
        })
    }
}

// =============================================================================
// CLOCK
// =============================================================================

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: OffsetDateTime) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
