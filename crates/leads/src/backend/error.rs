//! Backend error taxonomy.

use thiserror::Error;

/// Errors that can occur at the hosted-backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The operation needs a live backend and none is configured.
    ///
    /// Mutating operations surface this immediately; they never degrade to
    /// mock behavior.
    #[error("backend is not configured; set ZENTHRA_SUPABASE_URL and ZENTHRA_SUPABASE_ANON_KEY")]
    NotConfigured,

    /// Wrong password or unknown account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The operation requires an authenticated session and there is none.
    #[error("no active session")]
    NoSession,

    /// HTTP transport failed before the service could answer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error; `message` is its text verbatim.
    #[error("backend error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service answered with something we could not interpret.
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// True when retrying without reconfiguration can never help.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}
