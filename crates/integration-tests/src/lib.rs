//! Integration tests for Coronda.
//!
//! Both binaries' routers are served on ephemeral ports over one shared
//! in-memory document store and identity provider, and driven with real
//! HTTP clients that keep their own cookie jars. This covers the flows that
//! cross the storefront and the back-office: a customer's checkout showing
//! up in the admin, and admin edits showing up in the shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p coronda-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use secrecy::SecretString;
use tower_sessions::MemoryStore;

use coronda_admin::config::AdminConfig;
use coronda_platform::auth::DEFAULT_ADMIN_EMAIL;
use coronda_platform::identity::{FirebaseConfig, MemoryIdentity};
use coronda_platform::store::MemoryDocumentStore;
use coronda_storefront::config::{MERCADO_PAGO_API_URL, MercadoPagoConfig, StorefrontConfig};
use coronda_storefront::payments::{PaymentError, PaymentGateway, Preference, PreferenceRequest};

/// Password used for every test account.
pub const PASSWORD: &str = "secreto123";

/// Payment gateway that hands out numbered preferences.
#[derive(Debug, Default)]
pub struct CountingGateway {
    calls: AtomicUsize,
}

impl CountingGateway {
    /// Preferences created so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, PaymentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = request
            .sale_id
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        Ok(Preference {
            id: format!("pref-{n}-{reference}"),
            init_point: None,
        })
    }
}

/// Both APIs running against shared doubles.
pub struct TestContext {
    pub storefront_url: String,
    pub admin_url: String,
    pub store: Arc<MemoryDocumentStore>,
    pub identity: Arc<MemoryIdentity>,
    pub gateway: Arc<CountingGateway>,
}

impl TestContext {
    /// Start both servers.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound.
    pub async fn start() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let identity = Arc::new(MemoryIdentity::new());
        let gateway = Arc::new(CountingGateway::default());

        let storefront_state = coronda_storefront::state::AppState::new(
            storefront_config(),
            store.clone(),
            identity.clone(),
            gateway.clone(),
        );
        let storefront =
            coronda_storefront::build_app(storefront_state, MemoryStore::default(), false);

        let admin_state = coronda_admin::state::AppState::new(
            admin_config(),
            store.clone(),
            identity.clone(),
            None,
        );
        let admin = coronda_admin::build_app(admin_state, MemoryStore::default());

        Self {
            storefront_url: serve(storefront).await,
            admin_url: serve(admin).await,
            store,
            identity,
            gateway,
        }
    }

    /// A client with its own cookie jar, standing in for one browser.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("client")
    }

    pub fn shop(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    format!("http://{addr}")
}

fn firebase() -> FirebaseConfig {
    FirebaseConfig::new(SecretString::from("AIzaTestKey"))
}

/// Storefront settings for tests; no webhook secret.
pub fn storefront_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/coronda_test"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
        firebase: firebase(),
        mercado_pago: MercadoPagoConfig {
            access_token: SecretString::from("TEST-access-token"),
            public_key: "TEST-public-key".to_string(),
            return_url: "http://localhost:3000".to_string(),
            webhook_secret: None,
            api_url: MERCADO_PAGO_API_URL.to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Admin settings for tests; suggestions disabled.
pub fn admin_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/coronda_test"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3001".to_string(),
        session_secret: SecretString::from("y".repeat(32)),
        admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
        firebase: firebase(),
        claude: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
