//! Authentication store.
//!
//! Owns current-user identity, the session, and the derived admin flag.
//! The backend's session-change feed is the single writer of post-sign-in
//! profile state: `sign_in`/`sign_up` only report success and then wait for
//! the listener to land the change, so they can never race it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use zenthra_core::{Email, EmailError, UserProfile, derive_role};

use crate::backend::{
    AuthBackend, AuthUser, BackendError, NewProfile, Session, SignUpOutcome, UserAttributes,
};
use crate::session::SessionStore;

/// Minimum password length accepted by `change_password`.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A password field was left empty.
    #[error("all password fields are required")]
    MissingPassword,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The new password matches the current one.
    #[error("new password must be different from the current password")]
    PasswordUnchanged,

    /// The backend rejected or failed the operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Derived auth state, published on every change.
///
/// This is everything the route guard needs; consumers wanting the profile
/// itself ask the store directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Identity has not resolved yet.
    pub loading: bool,
    /// A current user exists.
    pub authenticated: bool,
    /// The profile is admin-capable (`role = admin` and active).
    pub admin: bool,
}

#[derive(Default)]
struct AuthState {
    user: Option<AuthUser>,
    session: Option<Session>,
    profile: Option<UserProfile>,
    loading: bool,
}

/// Process-wide authentication store.
///
/// Cheaply cloneable; clones share state. Must be created inside a Tokio
/// runtime (construction spawns the session-change listener).
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    backend: Arc<dyn AuthBackend>,
    sessions: Arc<dyn SessionStore>,
    state: RwLock<AuthState>,
    snapshot: watch::Sender<AuthSnapshot>,
    init_timeout: Duration,
}

impl AuthStore {
    /// Create the store with an injected backend strategy and session
    /// persistence. Starts in the loading state until [`initialize`]
    /// resolves it.
    ///
    /// [`initialize`]: Self::initialize
    #[must_use]
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        sessions: Arc<dyn SessionStore>,
        init_timeout: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(AuthSnapshot {
            loading: true,
            authenticated: false,
            admin: false,
        });
        let inner = Arc::new(AuthInner {
            backend,
            sessions,
            state: RwLock::new(AuthState {
                loading: true,
                ..AuthState::default()
            }),
            snapshot,
            init_timeout,
        });
        spawn_listener(&inner);
        Self { inner }
    }

    /// Resolve the initial auth state: restore a persisted profile blob,
    /// ask the backend for an existing session, and in any case stop
    /// loading within the bounded wait.
    ///
    /// The bound is a hard liveness guarantee - consumers must never spin
    /// indefinitely waiting for identity, even if the backend never answers.
    pub async fn initialize(&self) {
        let inner = &self.inner;

        let init = async {
            inner.restore_persisted();

            match inner.backend.current_session().await {
                Ok(Some(session)) => inner.apply_session(Some(session)).await,
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "failed to query existing session"),
            }
        };

        if tokio::time::timeout(inner.init_timeout, init).await.is_err() {
            tracing::warn!(
                timeout = ?inner.init_timeout,
                "auth initialization timed out; treating user as signed out"
            );
        }

        inner.set_loading(false);
    }

    /// Sign in with email and password.
    ///
    /// Credential verification is delegated to the backend; the resulting
    /// profile state arrives through the session-change listener, which
    /// this method waits for before returning.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address and
    /// `AuthError::Backend` with the backend's report otherwise.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.inner.set_loading(true);

        let mut updates = self.inner.snapshot.subscribe();
        let result = self
            .inner
            .backend
            .sign_in_with_password(&email, password)
            .await;

        match result {
            Ok(()) => {
                let _ = updates.wait_for(|snap| snap.authenticated).await;
                self.inner.set_loading(false);
                Ok(())
            }
            Err(e) => {
                self.inner.set_loading(false);
                Err(e.into())
            }
        }
    }

    /// Create an account.
    ///
    /// Whether this authenticates immediately is the backend's confirmation
    /// policy; the outcome says which happened.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address and
    /// `AuthError::Backend` with the backend's report otherwise.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = Email::parse(email)?;
        self.inner.set_loading(true);

        let mut updates = self.inner.snapshot.subscribe();
        let result = self.inner.backend.sign_up(&email, password, full_name).await;

        match result {
            Ok(SignUpOutcome::SessionEstablished) => {
                let _ = updates.wait_for(|snap| snap.authenticated).await;
                self.inner.set_loading(false);
                Ok(SignUpOutcome::SessionEstablished)
            }
            Ok(outcome) => {
                self.inner.set_loading(false);
                Ok(outcome)
            }
            Err(e) => {
                self.inner.set_loading(false);
                Err(e.into())
            }
        }
    }

    /// Sign out and clear every piece of local identity state, including
    /// all persisted session storage. Backend failures are logged, not
    /// surfaced: the local session is gone either way.
    pub async fn sign_out(&self) {
        self.inner.set_loading(true);

        if let Err(e) = self.inner.backend.sign_out().await {
            tracing::warn!(error = %e, "backend sign out reported an error");
        }

        {
            let mut state = self.inner.state_write();
            state.user = None;
            state.session = None;
            state.profile = None;
            state.loading = false;
        }
        if let Err(e) = self.inner.sessions.clear_all() {
            tracing::warn!(error = %e, "failed to clear persisted session state");
        }
        self.inner.publish();
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns a validation error before touching the backend when a field
    /// is empty, the new password is shorter than six characters, or it
    /// matches the current one; otherwise propagates the backend's report.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        if current.is_empty() || new.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if new.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if current == new {
            return Err(AuthError::PasswordUnchanged);
        }

        self.inner
            .backend
            .update_user(UserAttributes {
                password: Some(new.to_owned()),
            })
            .await?;
        Ok(())
    }

    /// The current user, if signed in.
    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.inner.state_read().user.clone()
    }

    /// The current session, if signed in.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.state_read().session.clone()
    }

    /// The current profile, if one resolved.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.inner.state_read().profile.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state_read().user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner
            .state_read()
            .profile
            .as_ref()
            .is_some_and(UserProfile::is_admin)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state_read().loading
    }

    /// The current derived state.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        *self.inner.snapshot.borrow()
    }

    /// Subscribe to derived-state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.snapshot.subscribe()
    }
}

/// Listen on the backend's session-change feed for the process lifetime.
///
/// Holds only a weak reference so an abandoned store shuts its listener
/// down instead of leaking the task.
fn spawn_listener(inner: &Arc<AuthInner>) {
    let mut events = inner.backend.subscribe();
    let weak = Arc::downgrade(inner);

    tokio::spawn(async move {
        loop {
            if events.changed().await.is_err() {
                break;
            }
            let session = events.borrow_and_update().clone();
            let Some(inner) = weak.upgrade() else { break };
            inner.apply_session(session).await;
        }
    });
}

impl AuthInner {
    fn state_read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore the persisted profile blob, if one exists and is usable.
    fn restore_persisted(&self) {
        let Some(profile) = self.sessions.load() else {
            return;
        };
        match Email::parse(&profile.email) {
            Ok(email) => {
                tracing::debug!(email = %email, "restored persisted session");
                let user = AuthUser {
                    id: profile.id.clone(),
                    email,
                    full_name: Some(profile.full_name.clone()),
                };
                let mut state = self.state_write();
                state.user = Some(user.clone());
                state.session = Some(Session { user });
                state.profile = Some(profile);
                drop(state);
                self.publish();
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted profile has an unusable email; ignoring it");
            }
        }
    }

    /// React to a session change: resolve the profile (fetching it, or
    /// synthesizing one that does not exist yet) and replace identity state.
    async fn apply_session(&self, session: Option<Session>) {
        match session {
            None => {
                let mut state = self.state_write();
                state.user = None;
                state.session = None;
                state.profile = None;
                drop(state);
                self.publish();
            }
            Some(session) => {
                let profile = self.resolve_profile(&session.user).await;
                if let Some(profile) = &profile
                    && let Err(e) = self.sessions.save(profile)
                {
                    tracing::warn!(error = %e, "failed to persist session blob");
                }

                let mut state = self.state_write();
                state.user = Some(session.user.clone());
                state.session = Some(session);
                state.profile = profile;
                state.loading = false;
                drop(state);
                self.publish();
            }
        }
    }

    /// Fetch the profile row, or synthesize and persist one when absent.
    ///
    /// Failures leave the profile unset - the user stays authenticated but
    /// without admin capability.
    async fn resolve_profile(&self, user: &AuthUser) -> Option<UserProfile> {
        match self.backend.fetch_profile(&user.id).await {
            Ok(Some(profile)) => return Some(profile),
            Ok(None) => {
                tracing::debug!(user = %user.id, "profile not found, creating a new one");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch user profile");
                return None;
            }
        }

        let full_name = user
            .full_name
            .clone()
            .unwrap_or_else(|| user.email.local_part().to_owned());
        let new_profile = NewProfile {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name,
            role: derive_role(&user.email),
            is_active: true,
        };

        match self.backend.create_profile(new_profile).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!(error = %e, "failed to create user profile");
                None
            }
        }
    }

    fn set_loading(&self, loading: bool) {
        {
            let mut state = self.state_write();
            state.loading = loading;
        }
        self.publish();
    }

    /// Recompute the derived snapshot and notify subscribers.
    fn publish(&self) {
        let snapshot = {
            let state = self.state_read();
            AuthSnapshot {
                loading: state.loading,
                authenticated: state.user.is_some(),
                admin: state.profile.as_ref().is_some_and(UserProfile::is_admin),
            }
        };
        self.snapshot.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::MissingPassword.to_string(),
            "all password fields are required"
        );
        assert_eq!(
            AuthError::Backend(BackendError::NotConfigured).to_string(),
            BackendError::NotConfigured.to_string()
        );
    }
}
