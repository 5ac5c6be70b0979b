//! The process-wide reactive stores and the composition root.

mod auth;
mod guard;
mod leads;

pub use auth::{AuthError, AuthSnapshot, AuthStore};
pub use guard::{AccessDecision, evaluate_access};
pub use leads::LeadStore;

use std::sync::Arc;

use crate::backend::{BackendError, MockBackend, SupabaseBackend};
use crate::config::BackendConfig;
use crate::session::{FileSessionStore, MemorySessionStore};

/// The two stores, wired to one backend strategy.
///
/// This is the composition root: the mock/live decision is consumed here,
/// exactly once, and the stores receive their collaborators by injection.
pub struct Stores {
    pub auth: AuthStore,
    pub leads: LeadStore,
}

impl Stores {
    /// Build both stores from the loaded configuration.
    ///
    /// Must be called inside a Tokio runtime; the auth store spawns its
    /// session-change listener on construction.
    ///
    /// # Errors
    ///
    /// Returns an error if the live backend client cannot be constructed.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        match config.live() {
            Some(live) => {
                tracing::info!(url = %live.url, "using Supabase backend");
                let backend = Arc::new(SupabaseBackend::new(&live)?);
                Ok(Self {
                    auth: AuthStore::new(
                        backend.clone(),
                        // Live mode keeps nothing durable on disk.
                        Arc::new(MemorySessionStore::new()),
                        config.auth_init_timeout,
                    ),
                    leads: LeadStore::new(backend),
                })
            }
            None => {
                tracing::warn!("backend not configured; serving mock data");
                let backend = Arc::new(MockBackend::new());
                Ok(Self {
                    auth: AuthStore::new(
                        backend.clone(),
                        Arc::new(FileSessionStore::new(config.data_dir.clone())),
                        config.auth_init_timeout,
                    ),
                    leads: LeadStore::new(backend),
                })
            }
        }
    }
}
