//! Application state for the corpus server

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::inventory::DocumentTracker;
use crate::providers::{FileSearchProvider, GeminiFileSearch};
use crate::registry::StoreRegistry;
use crate::session::ChatSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    registry: StoreRegistry,
    tracker: Arc<DocumentTracker>,
    session: ChatSession,
}

impl AppState {
    /// Create state backed by the Gemini File Search service
    pub fn new(config: AppConfig) -> Result<Self> {
        let provider: Arc<dyn FileSearchProvider> =
            Arc::new(GeminiFileSearch::new(&config.service)?);
        Ok(Self::with_provider(config, provider))
    }

    /// Create state with an explicit provider (used by tests)
    pub fn with_provider(config: AppConfig, provider: Arc<dyn FileSearchProvider>) -> Self {
        tracing::info!("Initializing session state (provider: {})", provider.name());

        let registry = StoreRegistry::new(provider.clone(), &config.limits);
        let tracker = Arc::new(DocumentTracker::new(
            provider.clone(),
            config.limits.clone(),
        ));
        let session = ChatSession::new(provider, tracker.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                registry,
                tracker,
                session,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the store registry
    pub fn registry(&self) -> &StoreRegistry {
        &self.inner.registry
    }

    /// Get the document tracker
    pub fn tracker(&self) -> &DocumentTracker {
        &self.inner.tracker
    }

    /// Get the chat session
    pub fn session(&self) -> &ChatSession {
        &self.inner.session
    }
}
