//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::session::{SessionEvents, SessionStatusCache, SubmissionRegistry};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the upstream client, configuration and per-session coordination.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    events: SessionEvents,
    status: SessionStatusCache,
    submissions: SubmissionRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let events = SessionEvents::new();
        let status = SessionStatusCache::new(&events);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                events,
                status,
                submissions: SubmissionRegistry::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the upstream API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    /// Session-status query cache used by the navbar.
    #[must_use]
    pub fn status(&self) -> &SessionStatusCache {
        &self.inner.status
    }

    #[must_use]
    pub fn submissions(&self) -> &SubmissionRegistry {
        &self.inner.submissions
    }
}
