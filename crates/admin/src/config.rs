//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `ADMIN_BASE_URL` - Public URL for the back-office
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars)
//! - `FIREBASE_API_KEY` - Firebase Web API key
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `STORE_ADMIN_EMAIL` - Email auto-provisioned as admin (default: admin@store.com)
//! - `FIREBASE_AUTH_ENDPOINT` - Identity Toolkit URL override (auth emulator)
//! - `ANTHROPIC_API_KEY` - Enables product suggestions for sales
//! - `CLAUDE_MODEL` - Model for suggestions (default: claude-sonnet-4-20250514)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;

use coronda_platform::auth::DEFAULT_ADMIN_EMAIL;
use coronda_platform::config::{
    ConfigError, get_database_url, get_env_or_default, get_optional_env, get_optional_secret,
    get_required_env, get_validated_secret, load_dotenv, parse_env_or_default, validate_base_url,
    validate_session_secret,
};
use coronda_platform::identity::FirebaseConfig;

/// Default Claude model for product suggestions.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Messages API endpoint.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Host to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL for the back-office
    pub base_url: String,
    /// Session secret
    pub session_secret: SecretString,
    /// Email that is provisioned as admin on first login
    pub admin_email: String,
    /// Identity provider settings
    pub firebase: FirebaseConfig,
    /// Claude settings; suggestions are disabled without them
    pub claude: Option<ClaudeConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Claude API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID
    pub model: String,
    /// Messages endpoint
    pub api_url: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ClaudeConfig {
    /// `None` when `ANTHROPIC_API_KEY` is unset.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = get_optional_secret("ANTHROPIC_API_KEY")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            api_key,
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
            api_url: get_env_or_default("ANTHROPIC_API_URL", ANTHROPIC_API_URL),
        }))
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = parse_env_or_default("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("ADMIN_PORT", "3001")?;
        let base_url =
            validate_base_url(&get_required_env("ADMIN_BASE_URL")?, "ADMIN_BASE_URL")?;
        let session_secret = get_validated_secret("ADMIN_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "ADMIN_SESSION_SECRET")?;

        let mut firebase = FirebaseConfig::new(get_validated_secret("FIREBASE_API_KEY")?);
        if let Some(endpoint) = get_optional_env("FIREBASE_AUTH_ENDPOINT") {
            firebase.endpoint = endpoint;
        }
        if let Some(endpoint) = get_optional_env("FIREBASE_TOKEN_ENDPOINT") {
            firebase.token_endpoint = endpoint;
        }

        let claude = ClaudeConfig::from_env()?;
        if claude.is_none() {
            tracing::info!("ANTHROPIC_API_KEY not set, product suggestions disabled");
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            admin_email: get_env_or_default("STORE_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            firebase,
            claude,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/coronda_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("y".repeat(32)),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            firebase: FirebaseConfig::new(SecretString::from("AIzaTestKey")),
            claude: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        assert_eq!(config.socket_addr().port(), 3001);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_claude_debug_redacts_key() {
        let config = ClaudeConfig {
            api_key: SecretString::from("sk-ant-very-secret"),
            model: DEFAULT_CLAUDE_MODEL.to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-ant-very-secret"));
    }
}
