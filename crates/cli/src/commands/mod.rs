//! Command implementations.

pub mod auth;
pub mod leads;

use thiserror::Error;

use zenthra_leads::{AuthError, BackendConfig, BackendError, ConfigError, Stores};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend rejected or failed an operation.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An auth operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Command arguments did not parse (bad status, priority, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced lead is not in the fetched collection.
    #[error("no lead with id {0}")]
    UnknownLead(String),
}

/// Composition root: load configuration, pick the backend strategy once,
/// and build both stores around it.
pub async fn build_stores() -> Result<Stores, CliError> {
    let config = BackendConfig::from_env()?;
    let stores = Stores::from_config(&config)?;
    stores.auth.initialize().await;
    Ok(stores)
}
