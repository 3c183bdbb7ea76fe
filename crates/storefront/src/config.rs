//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `FIREBASE_API_KEY` - Firebase Web API key
//! - `MP_ACCESS_TOKEN` - Mercado Pago access token (server-side only)
//! - `MP_PUBLIC_KEY` - Mercado Pago public key for the wallet widget
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STORE_ADMIN_EMAIL` - Email auto-provisioned as admin (default: admin@store.com)
//! - `FIREBASE_AUTH_ENDPOINT` - Identity Toolkit URL override (auth emulator)
//! - `MP_RETURN_URL` - Where Mercado Pago sends the buyer back (default: base URL)
//! - `MP_WEBHOOK_SECRET` - Secret for verifying webhook signatures
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Email that is provisioned as admin on first login
    pub admin_email: String,
    /// Firebase Auth configuration
    pub firebase: FirebaseConfig,
    /// Mercado Pago configuration
    pub mercado_pago: MercadoPagoConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Mercado Pago configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct MercadoPagoConfig {
    /// Access token for the REST API
    pub access_token: SecretString,
    /// Public key handed to the browser wallet widget
    pub public_key: String,
    /// `back_urls` target for success, failure and pending
    pub return_url: String,
    /// Shared secret for `x-signature` verification on webhooks
    pub webhook_secret: Option<SecretString>,
    /// API base URL
    pub api_url: String,
}

impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("return_url", &self.return_url)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Default Mercado Pago API base URL.
pub const MERCADO_PAGO_API_URL: &str = "https://api.mercadopago.com";

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let base_url = validate_base_url(
            &get_required_env("STOREFRONT_BASE_URL")?,
            "STOREFRONT_BASE_URL",
        )?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let mut firebase = FirebaseConfig::new(get_validated_secret("FIREBASE_API_KEY")?);
        if let Some(endpoint) = get_optional_env("FIREBASE_AUTH_ENDPOINT") {
            firebase.endpoint = endpoint;
        }
        if let Some(endpoint) = get_optional_env("FIREBASE_TOKEN_ENDPOINT") {
            firebase.token_endpoint = endpoint;
        }

        let mercado_pago = MercadoPagoConfig::from_env(&base_url)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            admin_email: get_env_or_default("STORE_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            firebase,
            mercado_pago,
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

    /// URL Mercado Pago posts payment notifications to.
    #[must_use]
    pub fn notification_url(&self) -> String {
        format!("{}/api/webhook", self.base_url)
    }
}

impl MercadoPagoConfig {
    fn from_env(base_url: &str) -> Result<Self, ConfigError> {
        let return_url = match get_optional_env("MP_RETURN_URL") {
            Some(url) => validate_base_url(&url, "MP_RETURN_URL")?,
            None => base_url.to_owned(),
        };

        Ok(Self {
            access_token: get_validated_secret("MP_ACCESS_TOKEN")?,
            public_key: get_required_env("MP_PUBLIC_KEY")?,
            return_url,
            webhook_secret: get_optional_secret("MP_WEBHOOK_SECRET")?,
            api_url: get_env_or_default("MP_API_URL", MERCADO_PAGO_API_URL),
        })
    }
}
