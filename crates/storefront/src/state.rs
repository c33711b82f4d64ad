//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::{CepClient, CepError, WhatsApp};

/// Error building the outbound clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("CEP client: {0}")]
    Cep(#[from] CepError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the outbound HTTP clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    cep: CepClient,
    catalog: Catalog,
    whatsapp: WhatsApp,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;
        let cep = CepClient::new(config.cep_lookup_url.clone())?;
        let catalog = Catalog::new(backend.clone());
        let whatsapp = WhatsApp::new(config.whatsapp_number.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                cep,
                catalog,
                whatsapp,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn cep(&self) -> &CepClient {
        &self.inner.cep
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn whatsapp(&self) -> &WhatsApp {
        &self.inner.whatsapp
    }
}
