//! Supabase backend implementation.
//!
//! Talks plain REST to the two services a Supabase project exposes: GoTrue
//! under `/auth/v1` for identity, PostgREST under `/rest/v1` for the `users`
//! and `leads` tables. One `reqwest` client with the anon key as a default
//! header; the session access token rides along as a bearer where one exists.

mod auth;
mod rows;
mod tables;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tokio::sync::watch;
use url::Url;

use zenthra_core::{Email, Lead, LeadId, LeadSubmission, LeadUpdate, UserId, UserProfile};

use super::{
    AuthBackend, AuthUser, BackendError, LeadsBackend, NewProfile, Session, SignUpOutcome,
    UserAttributes,
};
use crate::config::LiveConfig;

/// Client for a configured Supabase project.
pub struct SupabaseBackend {
    client: reqwest::Client,
    auth_base: Url,
    rest_base: Url,
    anon_key: String,
    session: RwLock<Option<LiveSession>>,
    events: watch::Sender<Option<Session>>,
}

/// The session plus the token that proves it.
#[derive(Debug, Clone)]
struct LiveSession {
    access_token: String,
    session: Session,
}

impl SupabaseBackend {
    /// Create a backend for the given live configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the anon key
    /// is not a valid header value.
    pub fn new(config: &LiveConfig) -> Result<Self, BackendError> {
        let anon_key = config.anon_key.expose_secret().to_owned();

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&anon_key)
                .map_err(|e| BackendError::Parse(format!("invalid anon key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let auth_base = config.url.join("auth/v1/").map_err(join_err)?;
        let rest_base = config.url.join("rest/v1/").map_err(join_err)?;
        let (events, _) = watch::channel(None);

        Ok(Self {
            client,
            auth_base,
            rest_base,
            anon_key,
            session: RwLock::new(None),
            events,
        })
    }

    fn session_read(&self) -> RwLockReadGuard<'_, Option<LiveSession>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_write(&self) -> RwLockWriteGuard<'_, Option<LiveSession>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bearer value for table requests: the session token when signed in,
    /// the anon key otherwise.
    fn bearer(&self) -> String {
        self.session_read()
            .as_ref()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token.clone())
    }

    fn access_token(&self) -> Option<String> {
        self.session_read().as_ref().map(|s| s.access_token.clone())
    }

    /// Install a session and publish the change on the feed.
    fn install_session(&self, live: LiveSession) {
        let session = live.session.clone();
        *self.session_write() = Some(live);
        self.events.send_replace(Some(session));
    }

    /// Drop the session and publish the change on the feed.
    fn clear_session(&self) {
        *self.session_write() = None;
        self.events.send_replace(None);
    }
}

#[async_trait]
impl AuthBackend for SupabaseBackend {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self.session_read().as_ref().map(|s| s.session.clone()))
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), BackendError> {
        let token = self.password_grant(email, password).await?;
        let user = AuthUser::try_from(token.user)?;
        tracing::debug!(email = %user.email, "signed in");
        self.install_session(LiveSession {
            access_token: token.access_token,
            session: Session { user },
        });
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let response = self.request_sign_up(email, password, full_name).await?;

        match (response.access_token, response.user) {
            (Some(access_token), Some(user_row)) => {
                let user = AuthUser::try_from(user_row)?;
                self.install_session(LiveSession {
                    access_token,
                    session: Session { user },
                });
                Ok(SignUpOutcome::SessionEstablished)
            }
            _ => {
                tracing::debug!(email = %email, "sign up accepted; confirmation pending");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.access_token();
        // Local state is discarded regardless of what the service says.
        self.clear_session();
        match token {
            Some(token) => self.revoke_session(&token).await,
            None => Ok(()),
        }
    }

    async fn update_user(&self, attrs: UserAttributes) -> Result<(), BackendError> {
        let token = self.access_token().ok_or(BackendError::NoSession)?;
        self.put_user(&token, &attrs).await
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        self.select_profile(id).await
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<UserProfile, BackendError> {
        self.insert_profile(profile).await
    }
}

#[async_trait]
impl LeadsBackend for SupabaseBackend {
    async fn list_leads(&self) -> Result<Vec<Lead>, BackendError> {
        self.select_leads().await
    }

    async fn insert_lead(&self, submission: LeadSubmission) -> Result<Lead, BackendError> {
        self.insert_lead_row(submission).await
    }

    async fn update_lead(&self, id: &LeadId, update: LeadUpdate) -> Result<Lead, BackendError> {
        self.update_lead_row(id, update).await
    }

    async fn delete_lead(&self, id: &LeadId) -> Result<(), BackendError> {
        self.delete_lead_row(id).await
    }
}

/// Base URLs are static path fragments; a failure here is a programming
/// error surfaced as a parse error rather than a panic.
fn join_err(e: url::ParseError) -> BackendError {
    BackendError::Parse(format!("invalid endpoint: {e}"))
}

/// Pull the human-readable message out of a service error body.
///
/// GoTrue and PostgREST disagree about the field name, so try the known
/// ones before falling back to the raw (truncated) body.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_owned();
            }
        }
    }
    if body.is_empty() {
        "no response body".to_owned()
    } else {
        truncate(body)
    }
}

/// Bound logged/propagated bodies; error pages can be huge.
fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}
