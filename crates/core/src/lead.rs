//! The lead record and its submission/patch shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LeadId, LeadPriority, LeadStatus};

/// A sales lead captured from the public contact form.
///
/// Every field mirrors the last known backend state: leads are never
/// constructed locally ahead of the backend confirming them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Backend-assigned identifier; unique and immutable.
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    /// Operator-authored free text.
    pub notes: Option<String>,
    /// Fixed at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Case-insensitive substring match across the text fields a human
    /// would search on: name, email, company, subject, and message.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
            || self
                .company
                .as_ref()
                .is_some_and(|c| c.to_lowercase().contains(&query))
            || self.subject.to_lowercase().contains(&query)
            || self.message.to_lowercase().contains(&query)
    }
}

/// Payload of a public contact-form submission.
///
/// Status and priority are deliberately absent: the backend fixes them to
/// `new`/`medium` on creation and the submitter cannot influence either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}

/// A partial update to a lead; only present fields are sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub notes: Option<String>,
}

impl LeadUpdate {
    /// An update that only advances the pipeline stage.
    #[must_use]
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// An update that only reassigns priority.
    #[must_use]
    pub fn priority(priority: LeadPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// An update that only replaces the operator notes.
    #[must_use]
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// True when no field is set; such an update is not worth sending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
