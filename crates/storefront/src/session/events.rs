//! Session lifecycle events.
//!
//! Form containers publish here when a visitor signs in or out; the
//! session-status cache listens and drops whatever it cached for that session.

use tokio::sync::broadcast;
use tower_sessions::session::Id;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Id),
    SignedOut(Id),
}

impl SessionEvent {
    /// The session the event is about.
    #[must_use]
    pub const fn session(&self) -> Id {
        match self {
            Self::SignedIn(id) | Self::SignedOut(id) => *id,
        }
    }
}

/// Broadcast channel for [`SessionEvent`]s.
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        // No subscribers means nothing is cached yet.
        if self.sender.send(event).is_err() {
            tracing::debug!(?event, "No session event subscribers");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}
