//! The user profile record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// A user profile row from the backend's `users` table.
///
/// Profiles are fetched by user id when a session is established; if none
/// exists one is synthesized with [`crate::derive_role`] and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether this profile may use the admin dashboard.
    ///
    /// Both conditions are required: an inactive admin is treated as a
    /// non-admin for every authorization check.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin) && self.is_active
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(role: Role, is_active: bool) -> UserProfile {
        UserProfile {
            id: UserId::new("admin-1"),
            email: "admin@zenthra.com".to_owned(),
            full_name: "Admin User".to_owned(),
            role,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_admin_requires_both_conditions() {
        assert!(profile(Role::Admin, true).is_admin());
        assert!(!profile(Role::Admin, false).is_admin());
        assert!(!profile(Role::User, true).is_admin());
        assert!(!profile(Role::User, false).is_admin());
    }

    #[test]
    fn test_profile_serde_field_names() {
        let json = serde_json::to_value(profile(Role::Admin, true)).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["is_active"], true);
        assert!(json.get("full_name").is_some());
    }
}
