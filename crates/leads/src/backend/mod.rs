//! The hosted-backend capability seam.
//!
//! Everything the stores need from the outside world lives here as two
//! traits, [`AuthBackend`] and [`LeadsBackend`]. The composition root picks
//! an implementation once - [`SupabaseBackend`] when the project is
//! configured, [`MockBackend`] otherwise - and the stores never look at the
//! mode again.

mod error;
pub mod mock;
pub mod supabase;

pub use error::BackendError;
pub use mock::MockBackend;
pub use supabase::SupabaseBackend;

use async_trait::async_trait;
use tokio::sync::watch;

use zenthra_core::{Email, Lead, LeadId, LeadSubmission, LeadUpdate, Role, UserId, UserProfile};

/// The authenticated account as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    /// Display name from the account metadata, when the backend has one.
    pub full_name: Option<String>,
}

/// An established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: AuthUser,
}

/// Attributes that can be changed on the authenticated account.
#[derive(Debug, Clone, Default)]
pub struct UserAttributes {
    pub password: Option<String>,
}

/// Fields for synthesizing a profile row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// What a successful sign-up left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable immediately; a session change was published.
    SessionEstablished,
    /// The backend's confirmation policy withheld a session (e.g. the user
    /// must click an email link first).
    ConfirmationRequired,
}

/// Authentication operations plus access to the `users` profile table.
///
/// Implementations publish every session change - sign-in, sign-up that
/// authenticates, sign-out - on the [`subscribe`](Self::subscribe) feed.
/// The feed is the single source of truth for post-sign-in state; the
/// operations themselves only report success or failure.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// The session currently known to this backend instance, if any.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Verify credentials and establish a session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidCredentials`] on a mismatch, or
    /// whatever error the hosted service reports.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), BackendError>;

    /// Create an account. Whether a session is established is the backend's
    /// confirmation policy, reported in the outcome.
    ///
    /// # Errors
    ///
    /// Returns whatever error the hosted service reports (duplicate account,
    /// weak password, rate limiting, ...).
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError>;

    /// Tear down the current session and publish the change.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted service rejects the revocation; local
    /// session state is discarded regardless.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Update attributes of the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NoSession`] without an active session, and
    /// [`BackendError::NotConfigured`] in mock mode.
    async fn update_user(&self, attrs: UserAttributes) -> Result<(), BackendError>;

    /// Session-change feed. Receivers observe the current session after
    /// every successful sign-in, authenticating sign-up, and sign-out, for
    /// the rest of the process lifetime.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// Fetch the profile row for a user id.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or service failures; a missing
    /// row is `Ok(None)`.
    async fn fetch_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError>;

    /// Insert a synthesized profile row and return the stored version.
    ///
    /// # Errors
    ///
    /// Returns whatever error the hosted service reports.
    async fn create_profile(&self, profile: NewProfile) -> Result<UserProfile, BackendError>;
}

/// Access to the `leads` table.
#[async_trait]
pub trait LeadsBackend: Send + Sync {
    /// All leads, newest first.
    ///
    /// # Errors
    ///
    /// Returns whatever error the hosted service reports. The mock
    /// implementation never fails; it serves the fixed sample dataset.
    async fn list_leads(&self) -> Result<Vec<Lead>, BackendError>;

    /// Create a lead from a public submission. Status and priority are
    /// forced to `new`/`medium`; the submitter cannot influence either.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotConfigured`] in mock mode - lead capture
    /// without persistence must never look like it succeeded.
    async fn insert_lead(&self, submission: LeadSubmission) -> Result<Lead, BackendError>;

    /// Apply a partial update and return the canonical stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotConfigured`] in mock mode, and the hosted
    /// service's error when the id does not exist.
    async fn update_lead(&self, id: &LeadId, update: LeadUpdate) -> Result<Lead, BackendError>;

    /// Delete a lead. Deleting an id that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotConfigured`] in mock mode.
    async fn delete_lead(&self, id: &LeadId) -> Result<(), BackendError>;
}
