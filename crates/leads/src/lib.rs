//! Zenthra Leads - lead-management and authentication stores.
//!
//! This crate is the data/auth-state core behind the Zenthra site: a pair of
//! process-wide reactive stores layered over a hosted backend-as-a-service
//! (Supabase: GoTrue auth + PostgREST tables), with a deterministic in-memory
//! mock mode when no backend is configured.
//!
//! # Architecture
//!
//! Data flows one direction: backend → store → derived state → consumer.
//! Mutations flow consumer → store method → backend → store state update.
//! No consumer talks to the backend directly; everything goes through a store.
//!
//! - [`config`] - environment configuration and the one-shot mock/live decision
//! - [`backend`] - the backend capability traits plus the Supabase and mock
//!   implementations, selected once at composition time
//! - [`session`] - pluggable persistence for the mock-mode session blob
//! - [`store`] - [`store::AuthStore`], [`store::LeadStore`], and the pure
//!   route-guard decision
//!
//! # Example
//!
//! ```rust,no_run
//! use zenthra_leads::{BackendConfig, Stores};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackendConfig::from_env()?;
//! let stores = Stores::from_config(&config)?;
//! stores.auth.initialize().await;
//! stores.leads.fetch_leads().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod session;
pub mod store;

pub use backend::{
    AuthBackend, AuthUser, BackendError, LeadsBackend, MockBackend, NewProfile, Session,
    SignUpOutcome, SupabaseBackend, UserAttributes,
};
pub use config::{BackendConfig, ConfigError, Mode};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use store::{
    AccessDecision, AuthError, AuthSnapshot, AuthStore, LeadStore, Stores, evaluate_access,
};
