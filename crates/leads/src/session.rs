//! Pluggable persistence for the mock-mode session blob.
//!
//! Mock mode survives restarts by writing the signed-in profile as a JSON
//! blob. The capability is a trait so the auth store never knows whether it
//! is talking to the filesystem or an in-memory map, and so tests can swap
//! the implementation freely.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use zenthra_core::UserProfile;

/// File name of the persisted session blob inside the data directory.
const SESSION_FILE: &str = "session.json";

/// Errors that can occur when persisting session state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem operation failed.
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile could not be serialized.
    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value persistence for the locally stored session.
///
/// `load` never fails: a corrupt blob is discarded and treated as signed
/// out, because a broken cache must not lock a user out of the app.
pub trait SessionStore: Send + Sync {
    /// Read the persisted profile, if a parseable one exists.
    fn load(&self) -> Option<UserProfile>;

    /// Persist the profile, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save(&self, profile: &UserProfile) -> Result<(), SessionError>;

    /// Wipe all locally persisted state, not just the session blob.
    ///
    /// Sign-out uses this deliberately broad reset so no stale local state
    /// survives a logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored state cannot be removed.
    fn clear_all(&self) -> Result<(), SessionError>;
}

/// Session persistence backed by a JSON file under a data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the given data directory.
    ///
    /// The directory is created lazily on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn blob_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<UserProfile> {
        let path = self.blob_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read session blob");
                return None;
            }
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "discarding corrupt session blob"
                );
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    fn save(&self, profile: &UserProfile) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string_pretty(profile)?;
        std::fs::write(self.blob_path(), raw)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), SessionError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session persistence for live mode and tests.
///
/// Live mode never writes durable local state; this store satisfies the
/// capability without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<UserProfile> {
        let raw = self.lock().get(SESSION_FILE).cloned()?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt in-memory session blob");
                self.lock().remove(SESSION_FILE);
                None
            }
        }
    }

    fn save(&self, profile: &UserProfile) -> Result<(), SessionError> {
        let raw = serde_json::to_string(profile)?;
        self.lock().insert(SESSION_FILE.to_owned(), raw);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), SessionError> {
        self.lock().clear();
        Ok(())
    }
}
