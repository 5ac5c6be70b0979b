//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ZENTHRA_SUPABASE_URL` - Base URL of the Supabase project
//!   (falls back to `SUPABASE_URL`)
//! - `ZENTHRA_SUPABASE_ANON_KEY` - Anon/public API key
//!   (falls back to `SUPABASE_ANON_KEY`)
//! - `ZENTHRA_DATA_DIR` - Directory for locally persisted mock-mode state
//!   (default: `.zenthra`)
//! - `ZENTHRA_AUTH_TIMEOUT_SECS` - Bounded wait for auth initialization
//!   (default: 3)
//!
//! The backend settings are deliberately optional: when either is absent, or
//! the URL is an obvious placeholder, the application runs in mock mode. The
//! decision is made once per process and never re-evaluated.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default data directory for mock-mode persisted state.
const DEFAULT_DATA_DIR: &str = ".zenthra";

/// Default bounded wait for auth initialization, in seconds.
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 3;

/// Blocklist of common placeholder patterns (case-insensitive).
///
/// Scaffold tooling ships env files with values like
/// `your_supabase_url_here`; treating them as configured would send real
/// requests to a nonsense host.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your_supabase_url_here",
    "your-project",
    "your_project",
    "changeme",
    "placeholder",
    "example.supabase.co",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which backend strategy the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A real Supabase project is configured.
    Live,
    /// No usable backend configuration; deterministic in-memory data.
    Mock,
}

/// Application configuration for the lead/auth stores.
#[derive(Clone)]
pub struct BackendConfig {
    /// Supabase project base URL, if configured with a usable value.
    supabase_url: Option<Url>,
    /// Supabase anon key, if configured.
    anon_key: Option<SecretString>,
    /// Directory for locally persisted mock-mode state.
    pub data_dir: PathBuf,
    /// Bounded wait applied to auth initialization only.
    pub auth_init_timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("supabase_url", &self.supabase_url)
            .field(
                "anon_key",
                &self.anon_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("data_dir", &self.data_dir)
            .field("auth_init_timeout", &self.auth_init_timeout)
            .finish()
    }
}

/// The settings a live backend needs, present and validated.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub url: Url,
    pub anon_key: SecretString,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    /// Missing backend settings are not an error; they select mock mode.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable has an unusable value
    /// (e.g. a non-numeric timeout).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let supabase_url = get_with_fallback("ZENTHRA_SUPABASE_URL", "SUPABASE_URL")
            .and_then(|raw| parse_supabase_url(&raw));
        let anon_key =
            get_with_fallback("ZENTHRA_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY")
                .map(SecretString::from);

        let data_dir = std::env::var("ZENTHRA_DATA_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let auth_timeout_secs = match std::env::var("ZENTHRA_AUTH_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("ZENTHRA_AUTH_TIMEOUT_SECS".to_owned(), e.to_string())
            })?,
            Err(_) => DEFAULT_AUTH_TIMEOUT_SECS,
        };

        Ok(Self {
            supabase_url,
            anon_key,
            data_dir,
            auth_init_timeout: Duration::from_secs(auth_timeout_secs),
        })
    }

    /// Build a configuration that always selects mock mode.
    #[must_use]
    pub fn mock(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            supabase_url: None,
            anon_key: None,
            data_dir: data_dir.into(),
            auth_init_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        }
    }

    /// The mock/live decision. Made from the loaded values once; callers are
    /// expected to consult it a single time at composition.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.supabase_url.is_some() && self.anon_key.is_some() {
            Mode::Live
        } else {
            Mode::Mock
        }
    }

    /// The validated live settings, when this configuration selects live mode.
    #[must_use]
    pub fn live(&self) -> Option<LiveConfig> {
        match (&self.supabase_url, &self.anon_key) {
            (Some(url), Some(anon_key)) => Some(LiveConfig {
                url: url.clone(),
                anon_key: anon_key.clone(),
            }),
            _ => None,
        }
    }
}

/// Get an environment variable, trying the namespaced name first.
fn get_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .or_else(|_| std::env::var(fallback))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Parse a configured Supabase URL, rejecting placeholders and garbage.
///
/// A rejected value selects mock mode rather than failing startup: the
/// application must stay usable on an unconfigured checkout.
fn parse_supabase_url(raw: &str) -> Option<Url> {
    if is_placeholder(raw) {
        tracing::warn!(url = %raw, "Supabase URL looks like a placeholder; running in mock mode");
        return None;
    }
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(url = %raw, error = %e, "Supabase URL is not valid; running in mock mode");
            None
        }
    }
}

/// Check a configured value against the placeholder blocklist.
fn is_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("your_supabase_url_here"));
        assert!(is_placeholder("https://YOUR-PROJECT.supabase.co"));
        assert!(is_placeholder("https://example.supabase.co"));
        assert!(!is_placeholder("https://abcdefgh.supabase.co"));
    }

    #[test]
    fn test_parse_supabase_url_rejects_placeholder() {
        assert!(parse_supabase_url("your_supabase_url_here").is_none());
    }

    #[test]
    fn test_parse_supabase_url_rejects_garbage() {
        assert!(parse_supabase_url("not a url at all").is_none());
    }

    #[test]
    fn test_parse_supabase_url_accepts_real_url() {
        let url = parse_supabase_url("https://abcdefgh.supabase.co").unwrap();
        assert_eq!(url.host_str(), Some("abcdefgh.supabase.co"));
    }

    #[test]
    fn test_mock_config_selects_mock_mode() {
        let config = BackendConfig::mock(".zenthra-test");
        assert_eq!(config.mode(), Mode::Mock);
        assert!(config.live().is_none());
    }

    #[test]
    fn test_live_requires_both_settings() {
        let config = BackendConfig {
            supabase_url: Some(Url::parse("https://abcdefgh.supabase.co").unwrap()),
            anon_key: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            auth_init_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        };
        assert_eq!(config.mode(), Mode::Mock);

        let config = BackendConfig {
            anon_key: Some(SecretString::from("anon-key")),
            ..config
        };
        assert_eq!(config.mode(), Mode::Live);
        assert!(config.live().is_some());
    }

    #[test]
    fn test_debug_redacts_anon_key() {
        let config = BackendConfig {
            supabase_url: Some(Url::parse("https://abcdefgh.supabase.co").unwrap()),
            anon_key: Some(SecretString::from("super-secret-anon-key")),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            auth_init_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-anon-key"));
    }
}
