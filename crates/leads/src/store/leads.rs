//! Lead store.
//!
//! Owns the in-memory lead collection. The collection is rebuilt wholesale
//! on every fetch (replace-all, never an incremental merge) and mutated
//! in place on add/update/delete using the backend's canonical records.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zenthra_core::{Lead, LeadId, LeadStatus, LeadSubmission, LeadUpdate};

use crate::backend::{BackendError, LeadsBackend};

#[derive(Default)]
struct LeadState {
    leads: Vec<Lead>,
    /// One shared busy flag for all four operations.
    loading: bool,
    /// One shared error message for all four operations; each operation
    /// clears it on entry and the latest failure wins.
    error: Option<String>,
}

/// Process-wide lead store.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct LeadStore {
    inner: Arc<LeadInner>,
}

struct LeadInner {
    backend: Arc<dyn LeadsBackend>,
    state: RwLock<LeadState>,
}

impl LeadStore {
    /// Create the store with an injected backend strategy.
    #[must_use]
    pub fn new(backend: Arc<dyn LeadsBackend>) -> Self {
        Self {
            inner: Arc::new(LeadInner {
                backend,
                state: RwLock::new(LeadState::default()),
            }),
        }
    }

    /// Replace the whole collection with the backend's current records.
    ///
    /// Never returns an error: fetches run from passive effects with no
    /// user action to report back to, so failures only set the shared
    /// error field and leave the existing collection untouched. Safe to
    /// call repeatedly and concurrently; the collection always ends up as
    /// one complete snapshot, never a merge of partial states.
    pub async fn fetch_leads(&self) {
        self.begin();

        match self.inner.backend.list_leads().await {
            Ok(leads) => {
                tracing::debug!(count = leads.len(), "fetched leads");
                let mut state = self.write();
                state.leads = leads;
                state.loading = false;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch leads");
                self.fail(&e);
            }
        }
    }

    /// Create a lead from a public contact-form submission.
    ///
    /// The creation waits for the backend's confirmation; on success the
    /// returned record (backend-assigned id and timestamps included) is
    /// prepended, keeping newest-first order without a refetch.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotConfigured` without a live backend - a
    /// submission that goes nowhere must never look like it succeeded -
    /// or the backend's reported error. Local state is not touched on
    /// failure.
    pub async fn add_lead(&self, submission: LeadSubmission) -> Result<Lead, BackendError> {
        self.begin();

        match self.inner.backend.insert_lead(submission).await {
            Ok(lead) => {
                tracing::info!(id = %lead.id, "lead added");
                let mut state = self.write();
                state.leads.insert(0, lead.clone());
                state.loading = false;
                Ok(lead)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add lead");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Send a partial update and replace the matching local record with
    /// the backend's canonical version, in place, preserving list order.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotConfigured` without a live backend, and
    /// the backend's report when the id does not exist remotely.
    pub async fn update_lead(
        &self,
        id: &LeadId,
        update: LeadUpdate,
    ) -> Result<Lead, BackendError> {
        self.begin();

        match self.inner.backend.update_lead(id, update).await {
            Ok(lead) => {
                tracing::info!(id = %lead.id, "lead updated");
                let mut state = self.write();
                if let Some(slot) = state.leads.iter_mut().find(|l| &l.id == id) {
                    *slot = lead.clone();
                }
                state.loading = false;
                Ok(lead)
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "failed to update lead");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Delete a lead remotely, then drop it from the collection by id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotConfigured` without a live backend, or the
    /// backend's report. Deleting an id that does not exist succeeds
    /// without removing anything.
    pub async fn delete_lead(&self, id: &LeadId) -> Result<(), BackendError> {
        self.begin();

        match self.inner.backend.delete_lead(id).await {
            Ok(()) => {
                tracing::info!(id = %id, "lead deleted");
                let mut state = self.write();
                state.leads.retain(|l| &l.id != id);
                state.loading = false;
                Ok(())
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "failed to delete lead");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// The current collection, newest first.
    #[must_use]
    pub fn leads(&self) -> Vec<Lead> {
        self.read().leads.clone()
    }

    /// Look up a single lead in the already-fetched collection.
    #[must_use]
    pub fn lead_by_id(&self, id: &LeadId) -> Option<Lead> {
        self.read().leads.iter().find(|l| &l.id == id).cloned()
    }

    /// All fetched leads in the given pipeline stage.
    #[must_use]
    pub fn leads_by_status(&self, status: LeadStatus) -> Vec<Lead> {
        self.read()
            .leads
            .iter()
            .filter(|l| l.status == status)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search across name, email, company,
    /// subject, and message. Operates only on the fetched collection.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Lead> {
        self.read()
            .leads
            .iter()
            .filter(|l| l.matches(query))
            .cloned()
            .collect()
    }

    /// The shared error message from the most recent failed operation.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// The shared busy flag.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    fn read(&self) -> RwLockReadGuard<'_, LeadState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LeadState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every operation starts busy with a clean error field.
    fn begin(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, error: &BackendError) {
        let mut state = self.write();
        state.error = Some(error.to_string());
        state.loading = false;
    }
}
