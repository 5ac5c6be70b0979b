//! Zenthra Core - Shared types library.
//!
//! This crate provides common types used across all Zenthra components:
//! - `leads` - Lead and auth stores over the hosted backend
//! - `cli` - Command-line tools for lead and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses, and roles
//! - [`lead`] - The lead record and its submission/patch shapes
//! - [`profile`] - The user profile record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod lead;
pub mod profile;
pub mod types;

pub use lead::{Lead, LeadSubmission, LeadUpdate};
pub use profile::UserProfile;
pub use types::*;
