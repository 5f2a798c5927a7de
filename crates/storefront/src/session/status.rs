//! Per-session query cache for the navigation chrome.
//!
//! Answers "is this visitor signed in?" from a `moka` cache keyed by
//! `(session id, query)`. Pending [`SessionEvent`]s are applied before every
//! read, so a login or logout is visible on the very next page.
//! Concurrent reads of a missing entry share a single fetch.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tower_sessions::session::Id;

use super::events::{SessionEvent, SessionEvents};
use super::token::{TokenStore, TokenStoreError};

/// Queries cached per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AuthStatus,
}

impl QueryKey {
    pub const ALL: [Self; 1] = [Self::AuthStatus];
}

pub struct SessionStatusCache {
    cache: Cache<(Id, QueryKey), bool>,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
}

impl SessionStatusCache {
    #[must_use]
    pub fn new(events: &SessionEvents) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(30 * 60))
            .build();

        Self {
            cache,
            events: Mutex::new(events.subscribe()),
        }
    }

    /// Whether the visitor holds a session token.
    ///
    /// Visitors without a session id have never signed in. Store failures
    /// read as signed out and are not cached.
    pub async fn is_authenticated<S: TokenStore>(&self, session: Option<Id>, store: &S) -> bool {
        self.apply_pending_events().await;

        let Some(id) = session else {
            return false;
        };

        let result = self
            .cache
            .try_get_with((id, QueryKey::AuthStatus), async {
                tracing::debug!("Fetching session status");
                Ok::<_, TokenStoreError>(store.get().await?.is_some())
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read session status");
            false
        })
    }

    /// Drop every cached query of `session`.
    pub async fn invalidate_session(&self, session: Id) {
        for query in QueryKey::ALL {
            self.cache.invalidate(&(session, query)).await;
        }
    }

    async fn apply_pending_events(&self) {
        let mut stale = Vec::new();
        let mut lagged = false;
        {
            let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                match events.try_recv() {
                    Ok(event) => stale.push(event.session()),
                    Err(TryRecvError::Lagged(_)) => lagged = true,
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }

        if lagged {
            tracing::debug!("Session events lagged, clearing status cache");
            self.cache.invalidate_all();
            return;
        }
        for id in stale {
            self.invalidate_session(id).await;
        }
    }
}

impl std::fmt::Debug for SessionStatusCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStatusCache")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
