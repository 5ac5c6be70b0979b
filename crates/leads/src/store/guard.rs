//! The protected-route access decision.

use super::auth::AuthSnapshot;

/// What a protected view should do, given the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the protected content.
    Allow,
    /// Identity has not resolved yet; render a neutral waiting state.
    ///
    /// Deciding while loading would flash a denial at users whose session
    /// is about to restore.
    Pending,
    /// Send the visitor to the sign-in entry point.
    RedirectToSignIn,
}

/// Pure gate for protected views.
///
/// Allows only an authenticated visitor, and only an admin-capable one when
/// `require_admin` is set.
#[must_use]
pub fn evaluate_access(snapshot: &AuthSnapshot, require_admin: bool) -> AccessDecision {
    if snapshot.loading {
        return AccessDecision::Pending;
    }
    if !snapshot.authenticated {
        return AccessDecision::RedirectToSignIn;
    }
    if require_admin && !snapshot.admin {
        return AccessDecision::RedirectToSignIn;
    }
    AccessDecision::Allow
}
