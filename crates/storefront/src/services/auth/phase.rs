//! Lifecycle of a single form submission.
//!
//! ```text
//! Idle --Validate--> Validating --Submit--> Submitting --Succeed--> Succeeded
//!                        |                      |
//!                        +--------Fail----------+-------Fail------> Failed
//! ```
//!
//! `Succeeded` and `Failed` are terminal. A resubmission starts a fresh
//! [`Submission`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Validate,
    Submit,
    Succeed,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {event:?} a submission that is {phase:?}")]
pub struct PhaseError {
    pub phase: SubmissionPhase,
    pub event: PhaseEvent,
}

#[derive(Debug, Default)]
pub struct Submission {
    phase: SubmissionPhase,
}

impl Submission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Apply `event`, rejecting transitions the lifecycle doesn't allow.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError` and leaves the phase unchanged on an illegal transition.
    pub fn advance(&mut self, event: PhaseEvent) -> Result<SubmissionPhase, PhaseError> {
        use PhaseEvent as E;
        use SubmissionPhase as P;

        let next = match (self.phase, event) {
            (P::Idle, E::Validate) => P::Validating,
            (P::Validating, E::Submit) => P::Submitting,
            (P::Submitting, E::Succeed) => P::Succeeded,
            (P::Validating | P::Submitting, E::Fail) => P::Failed,
            (phase, event) => return Err(PhaseError { phase, event }),
        };
        tracing::trace!(from = ?self.phase, to = ?next, "Submission phase");
        self.phase = next;
        Ok(next)
    }
}
