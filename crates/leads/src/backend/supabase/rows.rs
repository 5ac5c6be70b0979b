//! Wire types for the Supabase REST surface.
//!
//! Rows mirror the snake_case JSON the service speaks; conversion into the
//! domain types happens here and nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zenthra_core::{
    Lead, LeadId, LeadPriority, LeadStatus, LeadSubmission, LeadUpdate, Role, UserId, UserProfile,
};

use crate::backend::{AuthUser, BackendError, NewProfile};

/// A row of the `leads` table.
#[derive(Debug, Deserialize)]
pub(crate) struct LeadRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Self {
            id: LeadId::new(row.id),
            name: row.name,
            email: row.email,
            company: row.company,
            subject: row.subject,
            message: row.message,
            status: row.status,
            priority: row.priority,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert payload for the `leads` table.
///
/// Status and priority are fixed here, not taken from the submission: the
/// contact form cannot place a lead anywhere but the top of the pipeline.
#[derive(Debug, Serialize)]
pub(crate) struct LeadInsert {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: LeadStatus,
    pub priority: LeadPriority,
}

impl From<LeadSubmission> for LeadInsert {
    fn from(submission: LeadSubmission) -> Self {
        Self {
            name: submission.name,
            email: submission.email,
            company: submission.company,
            subject: submission.subject,
            message: submission.message,
            status: LeadStatus::New,
            priority: LeadPriority::Medium,
        }
    }
}

/// Patch payload for the `leads` table; absent fields are not sent at all.
#[derive(Debug, Serialize)]
pub(crate) struct LeadChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<LeadPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<LeadUpdate> for LeadChanges {
    fn from(update: LeadUpdate) -> Self {
        Self {
            name: update.name,
            email: update.email,
            company: update.company,
            subject: update.subject,
            message: update.message,
            status: update.status,
            priority: update.priority,
            notes: update.notes,
        }
    }
}

/// A row of the `users` profile table.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert payload for the `users` profile table; timestamps are
/// server-assigned.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileInsert {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<NewProfile> for ProfileInsert {
    fn from(profile: NewProfile) -> Self {
        Self {
            id: profile.id.into_inner(),
            email: profile.email.into_inner(),
            full_name: profile.full_name,
            role: profile.role,
            is_active: profile.is_active,
        }
    }
}

/// Metadata attached to a GoTrue account.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserMetadata {
    pub full_name: Option<String>,
}

/// The GoTrue user object.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserRow {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

impl TryFrom<AuthUserRow> for AuthUser {
    type Error = BackendError;

    fn try_from(row: AuthUserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .ok_or_else(|| BackendError::Parse("auth user has no email".to_owned()))?;
        let email = zenthra_core::Email::parse(&email)
            .map_err(|e| BackendError::Parse(format!("auth user email: {e}")))?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            full_name: row.user_metadata.and_then(|m| m.full_name),
        })
    }
}

/// Response of the password-grant token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub user: AuthUserRow,
}

/// Response of the signup endpoint.
///
/// When the project requires email confirmation there is no access token,
/// only the provisional user.
#[derive(Debug, Deserialize)]
pub(crate) struct SignUpResponse {
    pub access_token: Option<String>,
    pub user: Option<AuthUserRow>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_row_deserializes_service_json() {
        let row: LeadRow = serde_json::from_str(
            r#"{
                "id": "3f6d",
                "name": "John Smith",
                "email": "john.smith@techcorp.com",
                "company": null,
                "subject": "Inquiry",
                "message": "Hello",
                "status": "contacted",
                "priority": "high",
                "notes": null,
                "created_at": "2026-08-01T10:15:00+00:00",
                "updated_at": "2026-08-02T09:00:00+00:00"
            }"#,
        )
        .unwrap();
        let lead = Lead::from(row);
        assert_eq!(lead.id.as_str(), "3f6d");
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.priority, LeadPriority::High);
        assert!(lead.company.is_none());
    }

    #[test]
    fn test_insert_forces_pipeline_entry() {
        let insert = LeadInsert::from(LeadSubmission {
            name: "N".to_owned(),
            email: "n@example.com".to_owned(),
            company: None,
            subject: "S".to_owned(),
            message: "M".to_owned(),
        });
        assert_eq!(insert.status, LeadStatus::New);
        assert_eq!(insert.priority, LeadPriority::Medium);

        let json = serde_json::to_value(&insert).unwrap();
        assert_eq!(json["status"], "new");
        assert_eq!(json["priority"], "medium");
        // Absent company is omitted, not sent as null.
        assert!(json.get("company").is_none());
    }

    #[test]
    fn test_changes_serialize_only_present_fields() {
        let changes = LeadChanges::from(LeadUpdate::status(LeadStatus::Qualified));
        let json = serde_json::to_value(&changes).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(json["status"], "qualified");
    }

    #[test]
    fn test_auth_user_requires_email() {
        let row = AuthUserRow {
            id: "u-1".to_owned(),
            email: None,
            user_metadata: None,
        };
        assert!(AuthUser::try_from(row).is_err());

        let row = AuthUserRow {
            id: "u-1".to_owned(),
            email: Some("a@b.c".to_owned()),
            user_metadata: Some(UserMetadata {
                full_name: Some("Ada".to_owned()),
            }),
        };
        let user = AuthUser::try_from(row).unwrap();
        assert_eq!(user.full_name.as_deref(), Some("Ada"));
    }
}
