//! User roles and the email-based role derivation rule.

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Email domain whose accounts are provisioned as administrators.
pub const ADMIN_DOMAIN: &str = "zenthra.com";

/// The one non-corporate address that is also an administrator.
pub const ADMIN_EMAIL: &str = "team.zenthra@gmail.com";

/// Authorization role of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to the lead dashboard.
    Admin,
    /// No administrative access.
    #[default]
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Derive the role a freshly provisioned profile gets from its email address.
///
/// Accounts on the corporate domain, or the one fixed team address, are
/// administrators; everyone else is a plain user. This is a profile-bootstrap
/// business rule, not a security boundary: the hosted backend owns identity.
#[must_use]
pub fn derive_role(email: &Email) -> Role {
    if email.as_str() == ADMIN_EMAIL || email.domain() == ADMIN_DOMAIN {
        Role::Admin
    } else {
        Role::User
    }
}
