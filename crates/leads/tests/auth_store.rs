//! Integration tests for the auth store, driven through the mock backend
//! and a couple of purpose-built backend doubles.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use zenthra_core::{Email, Role, UserId, UserProfile};
use zenthra_leads::{
    AccessDecision, AuthBackend, AuthError, AuthStore, BackendError, FileSessionStore,
    MemorySessionStore, MockBackend, NewProfile, Session, SignUpOutcome, UserAttributes,
    evaluate_access,
};

const INIT_TIMEOUT: Duration = Duration::from_secs(3);

fn mock_store() -> AuthStore {
    AuthStore::new(
        Arc::new(MockBackend::new()),
        Arc::new(MemorySessionStore::new()),
        INIT_TIMEOUT,
    )
}

#[tokio::test]
async fn test_initialize_without_session_resolves_signed_out() {
    let store = mock_store();
    assert!(store.is_loading());

    store.initialize().await;
    assert!(!store.is_loading());
    assert!(!store.is_authenticated());
    assert!(store.profile().is_none());
}

#[tokio::test]
async fn test_sign_in_resolves_admin_profile() {
    let store = mock_store();
    store.initialize().await;

    store
        .sign_in("team.zenthra@gmail.com", "zenthra123")
        .await
        .unwrap();

    assert!(store.is_authenticated());
    assert!(store.is_admin());
    assert!(!store.is_loading());

    let profile = store.profile().unwrap();
    assert_eq!(profile.role, Role::Admin);
    assert!(profile.is_active);
    assert_eq!(profile.email, "team.zenthra@gmail.com");

    let session = store.session().unwrap();
    assert!(session.user.id.as_str().starts_with("mock-"));
}

#[tokio::test]
async fn test_every_demo_credential_signs_in() {
    for (email, password) in [
        ("team.zenthra@gmail.com", "zenthra123"),
        ("admin@zenthra.com", "admin123"),
        ("demo@zenthra.com", "demo123"),
    ] {
        let store = mock_store();
        store.initialize().await;
        store.sign_in(email, password).await.unwrap();
        // All demo accounts sit on the corporate domain or the team address.
        assert_eq!(store.profile().unwrap().role, Role::Admin, "{email}");
    }
}

#[tokio::test]
async fn test_sign_in_rejects_wrong_password() {
    let store = mock_store();
    store.initialize().await;

    let err = store
        .sign_in("demo@zenthra.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Backend(BackendError::InvalidCredentials)
    ));
    assert!(!store.is_authenticated());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_sign_in_rejects_unknown_account() {
    let store = mock_store();
    store.initialize().await;

    let err = store
        .sign_in("nobody@example.com", "demo123")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Backend(BackendError::InvalidCredentials)
    ));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_rejects_malformed_email_before_backend() {
    let store = mock_store();
    store.initialize().await;

    let err = store.sign_in("not-an-email", "password").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail(_)));
}

#[tokio::test]
async fn test_sign_up_derives_role_from_email() {
    let store = mock_store();
    store.initialize().await;

    let outcome = store
        .sign_up("visitor@example.com", "hunter22", "Visiting User")
        .await
        .unwrap();
    assert_eq!(outcome, SignUpOutcome::SessionEstablished);
    assert!(store.is_authenticated());

    let profile = store.profile().unwrap();
    assert_eq!(profile.role, Role::User);
    assert_eq!(profile.full_name, "Visiting User");
    assert!(!store.is_admin());
}

#[tokio::test]
async fn test_sign_up_on_corporate_domain_is_admin() {
    let store = mock_store();
    store.initialize().await;

    store
        .sign_up("newhire@zenthra.com", "welcome1", "New Hire")
        .await
        .unwrap();
    assert!(store.is_admin());
}

#[tokio::test]
async fn test_sign_out_clears_state_and_wipes_storage() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = AuthStore::new(
        Arc::new(MockBackend::new()),
        Arc::new(FileSessionStore::new(&data_dir)),
        INIT_TIMEOUT,
    );
    store.initialize().await;

    store
        .sign_in("admin@zenthra.com", "admin123")
        .await
        .unwrap();
    assert!(data_dir.join("session.json").exists());

    store.sign_out().await;
    assert!(!store.is_authenticated());
    assert!(store.profile().is_none());
    assert!(store.session().is_none());
    // The whole data dir is wiped, not just the session blob.
    assert!(!data_dir.exists());
}

#[tokio::test]
async fn test_session_restores_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    let first = AuthStore::new(
        Arc::new(MockBackend::new()),
        Arc::new(FileSessionStore::new(&data_dir)),
        INIT_TIMEOUT,
    );
    first.initialize().await;
    first
        .sign_in("admin@zenthra.com", "admin123")
        .await
        .unwrap();
    drop(first);

    // A fresh process: new backend, same data dir.
    let second = AuthStore::new(
        Arc::new(MockBackend::new()),
        Arc::new(FileSessionStore::new(&data_dir)),
        INIT_TIMEOUT,
    );
    second.initialize().await;

    assert!(second.is_authenticated());
    assert!(second.is_admin());
    assert_eq!(second.profile().unwrap().email, "admin@zenthra.com");
}

#[tokio::test]
async fn test_corrupt_session_blob_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("session.json"), "definitely not json").unwrap();

    let store = AuthStore::new(
        Arc::new(MockBackend::new()),
        Arc::new(FileSessionStore::new(&data_dir)),
        INIT_TIMEOUT,
    );
    store.initialize().await;

    assert!(!store.is_authenticated());
    assert!(!data_dir.join("session.json").exists());
}

#[tokio::test]
async fn test_change_password_validation_order() {
    let store = mock_store();
    store.initialize().await;

    assert!(matches!(
        store.change_password("", "newpassword").await.unwrap_err(),
        AuthError::MissingPassword
    ));
    assert!(matches!(
        store.change_password("old", "short").await.unwrap_err(),
        AuthError::WeakPassword(_)
    ));
    assert!(matches!(
        store
            .change_password("samesame", "samesame")
            .await
            .unwrap_err(),
        AuthError::PasswordUnchanged
    ));
    // Valid input reaches the backend, which has nowhere to send it.
    assert!(matches!(
        store
            .change_password("oldpassword", "newpassword")
            .await
            .unwrap_err(),
        AuthError::Backend(BackendError::NotConfigured)
    ));
}

#[tokio::test]
async fn test_route_guard_follows_auth_lifecycle() {
    let store = mock_store();

    // Identity unresolved: never decide yet.
    assert_eq!(
        evaluate_access(&store.snapshot(), true),
        AccessDecision::Pending
    );

    store.initialize().await;
    assert_eq!(
        evaluate_access(&store.snapshot(), true),
        AccessDecision::RedirectToSignIn
    );

    store
        .sign_in("team.zenthra@gmail.com", "zenthra123")
        .await
        .unwrap();
    assert_eq!(
        evaluate_access(&store.snapshot(), true),
        AccessDecision::Allow
    );
    assert_eq!(
        evaluate_access(&store.snapshot(), false),
        AccessDecision::Allow
    );

    store.sign_out().await;
    assert_eq!(
        evaluate_access(&store.snapshot(), true),
        AccessDecision::RedirectToSignIn
    );
}

// ============================================================================
// Backend doubles
// ============================================================================

/// A backend that never answers; exercises the bounded initialization wait.
struct HangingBackend {
    events: watch::Sender<Option<Session>>,
}

impl HangingBackend {
    fn new() -> Self {
        let (events, _) = watch::channel(None);
        Self { events }
    }
}

#[async_trait]
impl AuthBackend for HangingBackend {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        std::future::pending().await
    }

    async fn sign_in_with_password(
        &self,
        _email: &Email,
        _password: &str,
    ) -> Result<(), BackendError> {
        std::future::pending().await
    }

    async fn sign_up(
        &self,
        _email: &Email,
        _password: &str,
        _full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        std::future::pending().await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn update_user(&self, _attrs: UserAttributes) -> Result<(), BackendError> {
        std::future::pending().await
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, _id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        std::future::pending().await
    }

    async fn create_profile(&self, _profile: NewProfile) -> Result<UserProfile, BackendError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_initialization_is_bounded_even_if_backend_hangs() {
    let store = AuthStore::new(
        Arc::new(HangingBackend::new()),
        Arc::new(MemorySessionStore::new()),
        Duration::from_millis(50),
    );
    assert!(store.is_loading());

    // The outer timeout only fails the test if the liveness guarantee broke.
    tokio::time::timeout(Duration::from_secs(2), store.initialize())
        .await
        .expect("initialize must resolve within its bounded wait");

    assert!(!store.is_loading());
    assert!(!store.is_authenticated());
}

/// A backend whose profile table returns a fixed row, for pinning the
/// admin-capability invariant at the store level.
struct FixedProfileBackend {
    profile: UserProfile,
    events: watch::Sender<Option<Session>>,
}

impl FixedProfileBackend {
    fn new(role: Role, is_active: bool) -> Self {
        let now = Utc::now();
        let (events, _) = watch::channel(None);
        Self {
            profile: UserProfile {
                id: UserId::new("user-1"),
                email: "operator@zenthra.com".to_owned(),
                full_name: "Operator".to_owned(),
                role,
                is_active,
                created_at: now,
                updated_at: now,
            },
            events,
        }
    }
}

#[async_trait]
impl AuthBackend for FixedProfileBackend {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(None)
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        _password: &str,
    ) -> Result<(), BackendError> {
        let session = Session {
            user: zenthra_leads::AuthUser {
                id: self.profile.id.clone(),
                email: email.clone(),
                full_name: None,
            },
        };
        self.events.send_replace(Some(session));
        Ok(())
    }

    async fn sign_up(
        &self,
        _email: &Email,
        _password: &str,
        _full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        Ok(SignUpOutcome::ConfirmationRequired)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.events.send_replace(None);
        Ok(())
    }

    async fn update_user(&self, _attrs: UserAttributes) -> Result<(), BackendError> {
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, _id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        Ok(Some(self.profile.clone()))
    }

    async fn create_profile(&self, _profile: NewProfile) -> Result<UserProfile, BackendError> {
        Ok(self.profile.clone())
    }
}

#[tokio::test]
async fn test_admin_capability_requires_role_and_active() {
    for (role, is_active, expect_admin) in [
        (Role::Admin, true, true),
        (Role::Admin, false, false),
        (Role::User, true, false),
        (Role::User, false, false),
    ] {
        let store = AuthStore::new(
            Arc::new(FixedProfileBackend::new(role, is_active)),
            Arc::new(MemorySessionStore::new()),
            INIT_TIMEOUT,
        );
        store.initialize().await;
        store
            .sign_in("operator@zenthra.com", "irrelevant")
            .await
            .unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.is_admin(), expect_admin, "{role:?} active={is_active}");
    }
}
