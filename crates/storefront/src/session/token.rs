//! Where the upstream session token lives.
//!
//! The browser never sees the token: it is kept in the visitor's
//! server-side session and read back on every request that needs it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::Session;

use super::keys;
use super::submissions::SubmissionTicket;

/// Errors raised by a token store.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Storage for the upstream session token.
pub trait TokenStore: Sync {
    /// Replace the stored token.
    fn set(&self, token: SecretString) -> impl Future<Output = Result<(), TokenStoreError>> + Send;

    /// The stored token, if any.
    fn get(&self) -> impl Future<Output = Result<Option<SecretString>, TokenStoreError>> + Send;

    /// Forget the stored token.
    fn clear(&self) -> impl Future<Output = Result<(), TokenStoreError>> + Send;
}

// =============================================================================
// Session-backed store
// =============================================================================

/// Token store backed by the visitor's `tower-sessions` session.
#[derive(Clone)]
pub struct SessionTokenStore {
    session: Session,
    guard: Option<Arc<AtomicBool>>,
}

impl SessionTokenStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            guard: None,
        }
    }

    /// Tie writes to a submission: once the ticket is revoked, `set` leaves
    /// the session untouched.
    #[must_use]
    pub fn guarded_by(mut self, ticket: &SubmissionTicket) -> Self {
        self.guard = Some(ticket.flag());
        self
    }

    fn is_current(&self) -> bool {
        self.guard
            .as_ref()
            .is_none_or(|flag| flag.load(Ordering::Acquire))
    }
}

impl TokenStore for SessionTokenStore {
    async fn set(&self, token: SecretString) -> Result<(), TokenStoreError> {
        if !self.is_current() {
            tracing::debug!("Submission revoked, dropping session token");
            return Ok(());
        }

        self.session
            .insert(keys::ACCESS_TOKEN, token.expose_secret())
            .await?;

        // A logout may have revoked the ticket while the insert ran.
        if !self.is_current() {
            self.session.remove::<String>(keys::ACCESS_TOKEN).await?;
        }
        Ok(())
    }

    async fn get(&self) -> Result<Option<SecretString>, TokenStoreError> {
        let token: Option<String> = self.session.get(keys::ACCESS_TOKEN).await?;
        Ok(token.map(SecretString::from))
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        self.session.remove::<String>(keys::ACCESS_TOKEN).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local token store, used by the CLI and in tests.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<SecretString>>>,
}

impl MemoryTokenStore {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SecretString>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    async fn set(&self, token: SecretString) -> Result<(), TokenStoreError> {
        *self.slot() = Some(token);
        Ok(())
    }

    async fn get(&self) -> Result<Option<SecretString>, TokenStoreError> {
        Ok(self.slot().clone())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot() = None;
        Ok(())
    }
}
