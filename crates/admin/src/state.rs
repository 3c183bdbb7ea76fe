//! Application state shared across handlers.

use std::sync::Arc;

use coronda_platform::{AuthService, DocumentStore, IdentityProvider};

use crate::claude::LanguageModel;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The language model is optional: without an
/// API key the suggestions endpoint answers 503.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    model: Option<Arc<dyn LanguageModel>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                identity,
                model,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// The language model used for product suggestions, if configured.
    #[must_use]
    pub fn model(&self) -> Option<&dyn LanguageModel> {
        self.inner.model.as_deref()
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.store(),
            self.inner.identity.as_ref(),
            &self.inner.config.admin_email,
        )
    }
}
