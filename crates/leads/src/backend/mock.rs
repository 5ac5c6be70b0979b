//! In-memory backend for unconfigured checkouts.
//!
//! Serves a fixed, deterministic sample dataset and a small demo credential
//! table so the app is fully explorable without a Supabase project. Lead
//! mutations fail fast with [`BackendError::NotConfigured`]: a submission
//! that goes nowhere must never look like it succeeded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use zenthra_core::{
    Email, Lead, LeadId, LeadPriority, LeadStatus, LeadSubmission, LeadUpdate, UserId, UserProfile,
};

use super::{
    AuthBackend, AuthUser, BackendError, LeadsBackend, NewProfile, Session, SignUpOutcome,
    UserAttributes,
};

/// Demo accounts seeded into the credential table.
const DEMO_CREDENTIALS: &[(&str, &str)] = &[
    ("team.zenthra@gmail.com", "zenthra123"),
    ("admin@zenthra.com", "admin123"),
    ("demo@zenthra.com", "demo123"),
];

/// In-memory stand-in for the hosted backend.
pub struct MockBackend {
    credentials: Mutex<HashMap<String, String>>,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
    session: RwLock<Option<Session>>,
    events: watch::Sender<Option<Session>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock backend seeded with the demo credentials.
    #[must_use]
    pub fn new() -> Self {
        let credentials = DEMO_CREDENTIALS
            .iter()
            .map(|(email, password)| ((*email).to_owned(), (*password).to_owned()))
            .collect();
        let (events, _) = watch::channel(None);

        Self {
            credentials: Mutex::new(credentials),
            profiles: Mutex::new(HashMap::new()),
            session: RwLock::new(None),
            events,
        }
    }

    fn credentials_lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn profiles_lock(&self) -> MutexGuard<'_, HashMap<UserId, UserProfile>> {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn establish_session(&self, email: &Email, full_name: Option<&str>) {
        let session = Session {
            user: AuthUser {
                id: UserId::new(generate_id()),
                email: email.clone(),
                full_name: full_name.map(str::to_owned),
            },
        };
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.events.send_replace(Some(session));
    }
}

/// Locally assigned ids are marked so they can never be confused with
/// backend-assigned ones.
fn generate_id() -> String {
    format!("mock-{}", Uuid::new_v4().simple())
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(), BackendError> {
        let stored = self.credentials_lock().get(email.as_str()).cloned();
        match stored {
            Some(expected) if expected == password => {
                tracing::debug!(email = %email, "mock sign in");
                self.establish_session(email, None);
                Ok(())
            }
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        self.credentials_lock()
            .insert(email.as_str().to_owned(), password.to_owned());
        tracing::debug!(email = %email, "mock sign up");
        self.establish_session(email, Some(full_name));
        Ok(SignUpOutcome::SessionEstablished)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.events.send_replace(None);
        Ok(())
    }

    async fn update_user(&self, _attrs: UserAttributes) -> Result<(), BackendError> {
        Err(BackendError::NotConfigured)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.profiles_lock().get(id).cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<UserProfile, BackendError> {
        let now = Utc::now();
        let stored = UserProfile {
            id: profile.id.clone(),
            email: profile.email.into_inner(),
            full_name: profile.full_name,
            role: profile.role,
            is_active: profile.is_active,
            created_at: now,
            updated_at: now,
        };
        self.profiles_lock().insert(profile.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl LeadsBackend for MockBackend {
    async fn list_leads(&self) -> Result<Vec<Lead>, BackendError> {
        tracing::debug!("serving sample leads; backend is not configured");
        let mut leads = sample_leads();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn insert_lead(&self, _submission: LeadSubmission) -> Result<Lead, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn update_lead(&self, _id: &LeadId, _update: LeadUpdate) -> Result<Lead, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn delete_lead(&self, _id: &LeadId) -> Result<(), BackendError> {
        Err(BackendError::NotConfigured)
    }
}

/// The fixed sample dataset: eight leads spanning every pipeline stage and
/// every priority, with ages spread over the last month.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn sample_leads() -> Vec<Lead> {
    let now = Utc::now();
    let lead = |id: &str,
                name: &str,
                email: &str,
                company: Option<&str>,
                subject: &str,
                message: &str,
                status: LeadStatus,
                priority: LeadPriority,
                notes: Option<&str>,
                created_days_ago: i64,
                updated_days_ago: i64| Lead {
        id: LeadId::new(id),
        name: name.to_owned(),
        email: email.to_owned(),
        company: company.map(str::to_owned),
        subject: subject.to_owned(),
        message: message.to_owned(),
        status,
        priority,
        notes: notes.map(str::to_owned),
        created_at: now - Duration::days(created_days_ago),
        updated_at: now - Duration::days(updated_days_ago),
    };

    vec![
        lead(
            "lead-1",
            "John Smith",
            "john.smith@techcorp.com",
            Some("TechCorp Solutions"),
            "Mobile App Development Inquiry",
            "Hi, we are looking to develop a mobile application for our \
             e-commerce platform. We need both iOS and Android versions with \
             user authentication, a product catalog, shopping cart, and \
             payment integration. Could you provide a quote and timeline?",
            LeadStatus::New,
            LeadPriority::High,
            Some("Potential high-value client"),
            2,
            2,
        ),
        lead(
            "lead-2",
            "Sarah Johnson",
            "sarah.j@startup.io",
            Some("StartupIO"),
            "Web Application Development",
            "We need a modern web application built for our SaaS platform. \
             The app should include a user dashboard, analytics, subscription \
             management, and API integrations. Looking for a full-stack \
             solution.",
            LeadStatus::Contacted,
            LeadPriority::Medium,
            None,
            5,
            1,
        ),
        lead(
            "lead-3",
            "Michael Chen",
            "mchen@healthtech.com",
            Some("HealthTech Innovations"),
            "Healthcare Mobile App",
            "We want to create a healthcare mobile app for patient \
             management. Features needed: appointment scheduling, medical \
             records, telemedicine, and secure messaging. HIPAA compliance \
             is essential.",
            LeadStatus::Qualified,
            LeadPriority::High,
            Some("Discussed requirements in detail. Ready to proceed with proposal."),
            7,
            3,
        ),
        lead(
            "lead-4",
            "Emily Rodriguez",
            "emily@financeapp.com",
            Some("FinanceApp Ltd"),
            "Fintech Application Development",
            "Looking for a team to build a comprehensive fintech application \
             with budget tracking, investment portfolio, bill payments, and \
             financial analytics. Need both web and mobile versions.",
            LeadStatus::Converted,
            LeadPriority::High,
            Some("Project started. Contract signed."),
            14,
            7,
        ),
        lead(
            "lead-5",
            "David Wilson",
            "david.wilson@retailco.com",
            Some("RetailCo"),
            "E-commerce Platform Upgrade",
            "Our current e-commerce platform needs a complete overhaul. We \
             want a modern, fast, and scalable solution with AI \
             recommendations, inventory management, and multi-vendor support.",
            LeadStatus::New,
            LeadPriority::Medium,
            None,
            1,
            1,
        ),
        lead(
            "lead-6",
            "Lisa Thompson",
            "lisa@edutech.org",
            Some("EduTech Solutions"),
            "Educational Platform Development",
            "We need an online learning platform with video streaming, \
             interactive quizzes, progress tracking, and a certification \
             system. The platform should support thousands of concurrent \
             users.",
            LeadStatus::Contacted,
            LeadPriority::Medium,
            None,
            10,
            5,
        ),
        lead(
            "lead-7",
            "Robert Kim",
            "robert@logistics.com",
            None,
            "Logistics Management System",
            "We require a comprehensive logistics management system for \
             tracking shipments, managing inventory, route optimization, and \
             real-time updates. Integration with our existing ERP system is \
             needed.",
            LeadStatus::Qualified,
            LeadPriority::Low,
            None,
            21,
            14,
        ),
        lead(
            "lead-8",
            "Amanda Foster",
            "amanda@realestate.com",
            Some("Foster Real Estate"),
            "Real Estate Management App",
            "Looking to develop a real estate management application with \
             property listings, virtual tours, client management, and \
             document handling. Both web and mobile versions required.",
            LeadStatus::Closed,
            LeadPriority::Low,
            Some("Client decided to go with another vendor."),
            30,
            21,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_shape() {
        let leads = sample_leads();
        assert_eq!(leads.len(), 8);

        // Every pipeline stage and every priority is represented.
        for status in LeadStatus::ALL {
            assert!(leads.iter().any(|l| l.status == status), "missing {status}");
        }
        for priority in LeadPriority::ALL {
            assert!(leads.iter().any(|l| l.priority == priority));
        }
    }

    #[test]
    fn test_sample_ids_are_unique() {
        let leads = sample_leads();
        let mut ids: Vec<_> = leads.iter().map(|l| l.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), leads.len());
    }

    #[test]
    fn test_generated_ids_are_marked() {
        let id = generate_id();
        assert!(id.starts_with("mock-"));
        assert_ne!(generate_id(), generate_id());
    }

    #[tokio::test]
    async fn test_list_leads_is_newest_first() {
        let backend = MockBackend::new();
        let leads = backend.list_leads().await.unwrap();
        for pair in leads.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert_eq!(leads.first().map(|l| l.id.as_str()), Some("lead-5"));
    }

    #[tokio::test]
    async fn test_writes_fail_not_configured() {
        let backend = MockBackend::new();
        let submission = LeadSubmission {
            name: "Test".to_owned(),
            email: "t@example.com".to_owned(),
            company: None,
            subject: "Subject".to_owned(),
            message: "Message".to_owned(),
        };
        assert!(matches!(
            backend.insert_lead(submission).await,
            Err(BackendError::NotConfigured)
        ));
        assert!(matches!(
            backend
                .update_lead(&LeadId::new("lead-1"), LeadUpdate::default())
                .await,
            Err(BackendError::NotConfigured)
        ));
        assert!(matches!(
            backend.delete_lead(&LeadId::new("lead-1")).await,
            Err(BackendError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_and_session_feed() {
        let backend = MockBackend::new();
        let mut events = backend.subscribe();
        assert!(events.borrow().is_none());

        let email = Email::parse("demo@zenthra.com").unwrap();
        backend
            .sign_in_with_password(&email, "demo123")
            .await
            .unwrap();

        let session = events.borrow_and_update().clone().unwrap();
        assert_eq!(session.user.email, email);
        assert!(session.user.id.as_str().starts_with("mock-"));
        assert!(backend.current_session().await.unwrap().is_some());

        backend.sign_out().await.unwrap();
        assert!(events.borrow_and_update().is_none());
        assert!(backend.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_credentials() {
        let backend = MockBackend::new();
        let email = Email::parse("demo@zenthra.com").unwrap();
        assert!(matches!(
            backend.sign_in_with_password(&email, "wrong").await,
            Err(BackendError::InvalidCredentials)
        ));

        let unknown = Email::parse("nobody@example.com").unwrap();
        assert!(matches!(
            backend.sign_in_with_password(&unknown, "demo123").await,
            Err(BackendError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_registers_credentials() {
        let backend = MockBackend::new();
        let email = Email::parse("new.user@example.com").unwrap();
        let outcome = backend.sign_up(&email, "hunter22", "New User").await.unwrap();
        assert_eq!(outcome, SignUpOutcome::SessionEstablished);

        backend.sign_out().await.unwrap();
        backend
            .sign_in_with_password(&email, "hunter22")
            .await
            .unwrap();
    }
}
