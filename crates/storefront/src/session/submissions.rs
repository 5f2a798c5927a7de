//! In-flight form submissions.
//!
//! At most one submission per (session, form) runs at a time. Holding a
//! [`SubmissionTicket`] is holding that slot; dropping it frees the slot.
//! Logging out revokes every ticket of the session, so results that arrive
//! afterwards can be recognised and discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tower_sessions::session::Id;

/// The forms that submit to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    Signup,
}

type Slots = HashMap<(Id, FormKind), Arc<AtomicBool>>;

#[derive(Clone, Default)]
pub struct SubmissionRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl SubmissionRegistry {
    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the submission slot for `kind` in `session`.
    ///
    /// Returns `None` while another submission of the same form is pending.
    #[must_use]
    pub fn begin(&self, session: Id, kind: FormKind) -> Option<SubmissionTicket> {
        let mut slots = self.slots();
        if slots.contains_key(&(session, kind)) {
            return None;
        }

        let current = Arc::new(AtomicBool::new(true));
        slots.insert((session, kind), Arc::clone(&current));

        Some(SubmissionTicket {
            registry: self.clone(),
            key: (session, kind),
            current,
        })
    }

    /// Mark every pending submission of `session` as no longer relevant.
    pub fn revoke(&self, session: Id) {
        self.slots().retain(|(id, _), current| {
            if *id == session {
                current.store(false, Ordering::Release);
                false
            } else {
                true
            }
        });
    }

    #[must_use]
    pub fn is_pending(&self, session: Id, kind: FormKind) -> bool {
        self.slots().contains_key(&(session, kind))
    }
}

impl std::fmt::Debug for SubmissionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionRegistry")
            .field("pending", &self.slots().len())
            .finish()
    }
}

/// A claimed submission slot.
pub struct SubmissionTicket {
    registry: SubmissionRegistry,
    key: (Id, FormKind),
    current: Arc<AtomicBool>,
}

impl SubmissionTicket {
    /// False once the session logged out after this submission started.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire)
    }

    pub(super) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.current)
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        let mut slots = self.registry.slots();
        // A revoked slot may already have been claimed by a newer submission.
        if slots
            .get(&self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.current))
        {
            slots.remove(&self.key);
        }
    }
}
