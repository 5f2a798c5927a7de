//! Visitor session state: the token store, the session-status query cache,
//! session events and in-flight form submissions.

pub mod events;
pub mod status;
pub mod submissions;
pub mod token;

pub use events::{SessionEvent, SessionEvents};
pub use status::{QueryKey, SessionStatusCache};
pub use submissions::{FormKind, SubmissionRegistry, SubmissionTicket};
pub use token::{MemoryTokenStore, SessionTokenStore, TokenStore, TokenStoreError};

/// Session data keys.
pub mod keys {
    /// Upstream session token issued on login.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Unix timestamp of the first form submission in this session.
    pub const STARTED_AT: &str = "started_at";
}
