//! Error types for ticket domain validation and lifecycle guards.

use super::{TicketId, TicketStatus};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain ticket values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketDomainError {
    /// The ticket summary is empty after trimming.
    #[error("ticket summary must not be empty")]
    EmptySummary,

    /// The problem description is empty after trimming.
    #[error("ticket problem description must not be empty")]
    EmptyProblemDescription,

    /// The requested lifecycle transition is not permitted from the current
    /// status, or its time guard has not been satisfied.
    #[error("invalid transition from '{from}' to '{to}' for ticket {ticket_id}")]
    InvalidTransition {
        /// Ticket the transition was attempted on.
        ticket_id: TicketId,
        /// Status the ticket currently holds.
        from: TicketStatus,
        /// Status the transition targeted.
        to: TicketStatus,
    },

    /// The auto-complete deadline would exceed the supported timestamp range.
    #[error("auto-complete deadline out of range for ticket {0}")]
    DeadlineOutOfRange(TicketId),
}

impl TicketDomainError {
    /// Creates a [`TicketDomainError::InvalidTransition`] for the given
    /// ticket and status pair.
    #[must_use]
    pub const fn invalid_transition(
        ticket_id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Self {
        Self::InvalidTransition {
            ticket_id,
            from,
            to,
        }
    }
}

/// Error returned while parsing ticket statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket status: {0}")]
pub struct ParseTicketStatusError(pub String);

/// Error returned while parsing ticket event kinds from envelope types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket event kind: {0}")]
pub struct UnknownEventKindError(pub String);
