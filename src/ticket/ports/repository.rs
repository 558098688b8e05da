//! Repository port for ticket persistence and status-guarded updates.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::ticket::domain::{ProfileId, Ticket, TicketId, TicketStatus};

/// Result type for ticket repository operations.
pub type TicketRepositoryResult<T> = Result<T, TicketRepositoryError>;

/// Ticket persistence contract.
///
/// Lifecycle writes go through [`TicketRepository::update_transition`],
/// which compares the stored status before persisting so concurrent
/// transitions resolve to exactly one winner.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Stores a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::DuplicateTicket`] when the ticket ID
    /// already exists.
    async fn create(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Finds a ticket by identifier.
    ///
    /// Returns `None` when the ticket does not exist.
    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>>;

    /// Returns all tickets whose status is one of `statuses`.
    ///
    /// An empty slice yields an empty result. Ordering is
    /// implementation-defined; callers needing a stable order sort the
    /// result themselves.
    async fn list_by_status(
        &self,
        statuses: &[TicketStatus],
    ) -> TicketRepositoryResult<Vec<Ticket>>;

    /// Returns all tickets opened by the given profile.
    async fn list_by_creator(&self, creator: ProfileId) -> TicketRepositoryResult<Vec<Ticket>>;

    /// Returns all tickets currently assigned to the given profile.
    async fn list_by_assignee(&self, assignee: ProfileId) -> TicketRepositoryResult<Vec<Ticket>>;

    /// Persists a lifecycle transition, guarded by the status the caller
    /// read before applying it.
    ///
    /// The write succeeds only while the stored status still equals
    /// `expected_status`; a concurrent transition that moved the ticket
    /// first loses nothing and the caller observes the conflict instead.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::NotFound`] when the ticket does not
    /// exist, or [`TicketRepositoryError::StatusConflict`] when the stored
    /// status no longer matches `expected_status`.
    async fn update_transition(
        &self,
        expected_status: TicketStatus,
        ticket: &Ticket,
    ) -> TicketRepositoryResult<()>;

    /// Removes every ticket.
    ///
    /// Intended for tests and development resets.
    async fn clear(&self) -> TicketRepositoryResult<()>;
}

/// Errors returned by ticket repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TicketRepositoryError {
    /// A ticket with the same identifier already exists.
    #[error("duplicate ticket identifier: {0}")]
    DuplicateTicket(TicketId),

    /// The ticket was not found.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),

    /// The stored status no longer matched the caller's expectation.
    #[error("ticket {ticket_id} expected status '{expected}' but found '{actual}'")]
    StatusConflict {
        /// Ticket the guarded write targeted.
        ticket_id: TicketId,
        /// Status the caller read before applying the transition.
        expected: TicketStatus,
        /// Status found in the store at write time.
        actual: TicketStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TicketRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
