//! Service layer for ticket lifecycle orchestration.

use crate::bus::EventBus;
use crate::ticket::{
    domain::{
        ProfileId, Ticket, TicketDomainError, TicketDraft, TicketEvent, TicketEventKind, TicketId,
        TicketStatus,
    },
    ports::{TicketRepository, TicketRepositoryError},
};
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Grace period between an engineer marking a ticket fixed and the ticket
/// auto-completing without a customer response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCompletePolicy {
    grace: TimeDelta,
}

impl AutoCompletePolicy {
    /// Creates a policy with the given grace period.
    #[must_use]
    pub const fn new(grace: TimeDelta) -> Self {
        Self { grace }
    }

    /// Returns the grace period.
    #[must_use]
    pub const fn grace(&self) -> TimeDelta {
        self.grace
    }
}

impl Default for AutoCompletePolicy {
    /// Five minutes, matching the confirmation window customers are shown.
    fn default() -> Self {
        Self::new(TimeDelta::seconds(300))
    }
}

/// Request payload for opening a support ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicketRequest {
    summary: String,
    problem_description: String,
    estimated_time: Option<String>,
    created_by: ProfileId,
}

impl OpenTicketRequest {
    /// Creates a request with the required customer-facing fields.
    #[must_use]
    pub fn new(
        summary: impl Into<String>,
        problem_description: impl Into<String>,
        created_by: ProfileId,
    ) -> Self {
        Self {
            summary: summary.into(),
            problem_description: problem_description.into(),
            estimated_time: None,
            created_by,
        }
    }

    /// Sets the customer's free-form time estimate.
    #[must_use]
    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        self.estimated_time = Some(estimated_time.into());
        self
    }
}

/// Service-level errors for ticket lifecycle operations.
#[derive(Debug, Error)]
pub enum TicketLifecycleError {
    /// Domain validation or transition guard failed.
    #[error(transparent)]
    Domain(#[from] TicketDomainError),
    /// The ticket targeted by a transition does not exist.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TicketRepositoryError),
}

/// Result type for ticket lifecycle service operations.
pub type TicketLifecycleResult<T> = Result<T, TicketLifecycleError>;

/// Ticket lifecycle orchestration service.
///
/// Every write is two-phase: the repository write is acknowledged first,
/// then the matching event is emitted best-effort. An emit failure is
/// logged and never rolls back or fails the operation, so consumers see
/// events as hints and the store as truth.
///
/// Transitions load the current row, apply the domain operation to the
/// loaded copy, and persist through the status-guarded update. A concurrent
/// writer that moved the ticket between load and write surfaces as
/// [`TicketRepositoryError::StatusConflict`].
pub struct TicketLifecycleService<R, B, C>
where
    R: TicketRepository,
    B: EventBus,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    bus: Arc<B>,
    clock: Arc<C>,
    policy: AutoCompletePolicy,
}

// Manual impl instead of `#[derive(Clone)]`: every field is an `Arc` (or
// `Copy`), so cloning must not require `R`, `B`, or `C` to be `Clone`.
impl<R, B, C> Clone for TicketLifecycleService<R, B, C>
where
    R: TicketRepository,
    B: EventBus,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            bus: Arc::clone(&self.bus),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<R, B, C> TicketLifecycleService<R, B, C>
where
    R: TicketRepository,
    B: EventBus,
    C: Clock + Send + Sync,
{
    /// Creates a new ticket lifecycle service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        bus: Arc<B>,
        clock: Arc<C>,
        policy: AutoCompletePolicy,
    ) -> Self {
        Self {
            repository,
            bus,
            clock,
            policy,
        }
    }

    /// Opens a new ticket in the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Domain`] when the request fields fail
    /// validation, or [`TicketLifecycleError::Repository`] when persistence
    /// rejects the ticket.
    pub async fn open_ticket(&self, request: OpenTicketRequest) -> TicketLifecycleResult<Ticket> {
        let mut draft = TicketDraft::new(request.summary, request.problem_description)?;
        if let Some(estimated_time) = request.estimated_time {
            draft = draft.with_estimated_time(estimated_time);
        }
        let ticket = Ticket::open(draft, request.created_by, &*self.clock);
        self.repository.create(&ticket).await?;
        self.emit(TicketEventKind::Created, &ticket);
        Ok(ticket)
    }

    /// Claims a waiting ticket for the given engineer.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not waiting, or
    /// [`TicketLifecycleError::Repository`] when the guarded write fails or
    /// loses a claim race.
    pub async fn claim(
        &self,
        ticket_id: TicketId,
        engineer: ProfileId,
    ) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.claim(engineer, &*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Claimed, &ticket);
        Ok(ticket)
    }

    /// Records the assigned engineer's fix and arms the auto-complete
    /// deadline from the service policy.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not in progress,
    /// or [`TicketLifecycleError::Repository`] when the guarded write fails.
    pub async fn mark_as_fixed(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.mark_as_fixed(self.policy.grace(), &*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Updated, &ticket);
        Ok(ticket)
    }

    /// Completes the ticket on the customer's confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not awaiting
    /// confirmation, or [`TicketLifecycleError::Repository`] when the
    /// guarded write fails.
    pub async fn confirm_resolved(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.confirm_resolved(&*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Updated, &ticket);
        Ok(ticket)
    }

    /// Returns the ticket to the assignee's queue after the customer
    /// rejects the fix.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not awaiting
    /// confirmation, or [`TicketLifecycleError::Repository`] when the
    /// guarded write fails.
    pub async fn mark_still_broken(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.mark_still_broken(&*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Updated, &ticket);
        Ok(ticket)
    }

    /// Completes the ticket after its confirmation window lapsed without a
    /// customer response.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not awaiting
    /// confirmation or its deadline has not passed, or
    /// [`TicketLifecycleError::Repository`] when the guarded write fails.
    pub async fn auto_complete(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.auto_complete(&*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Updated, &ticket);
        Ok(ticket)
    }

    /// Releases an in-progress ticket back to the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotFound`] when the ticket does not
    /// exist, [`TicketLifecycleError::Domain`] when it is not in progress,
    /// or [`TicketLifecycleError::Repository`] when the guarded write fails.
    pub async fn abandon(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        let expected = ticket.status();
        ticket.abandon(&*self.clock)?;
        self.repository.update_transition(expected, &ticket).await?;
        self.emit(TicketEventKind::Abandoned, &ticket);
        Ok(ticket)
    }

    /// Retrieves a ticket by identifier.
    ///
    /// Returns `Ok(None)` when the ticket does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Repository`] when the lookup fails.
    pub async fn find_ticket(&self, ticket_id: TicketId) -> TicketLifecycleResult<Option<Ticket>> {
        Ok(self.repository.find_by_id(ticket_id).await?)
    }

    /// Lists tickets holding any of the given statuses.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Repository`] when a lookup fails.
    pub async fn list_by_status(
        &self,
        statuses: &[TicketStatus],
    ) -> TicketLifecycleResult<Vec<Ticket>> {
        Ok(self.repository.list_by_status(statuses).await?)
    }

    /// Lists tickets opened by the given profile.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Repository`] when the lookup fails.
    pub async fn list_by_creator(&self, creator: ProfileId) -> TicketLifecycleResult<Vec<Ticket>> {
        Ok(self.repository.list_by_creator(creator).await?)
    }

    /// Lists tickets currently assigned to the given profile.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Repository`] when the lookup fails.
    pub async fn list_by_assignee(
        &self,
        assignee: ProfileId,
    ) -> TicketLifecycleResult<Vec<Ticket>> {
        Ok(self.repository.list_by_assignee(assignee).await?)
    }

    /// Completes every awaiting-confirmation ticket whose deadline has
    /// passed and returns the tickets this call terminally advanced.
    ///
    /// Safe to run from multiple clients concurrently: losing the guarded
    /// write to another sweeper skips the contested ticket rather than
    /// failing the sweep. No scheduler is built in; callers decide when to
    /// poll.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::Repository`] when listing fails or a
    /// guarded write fails for a reason other than losing the race.
    pub async fn sweep_auto_complete(&self) -> TicketLifecycleResult<Vec<Ticket>> {
        let candidates = self
            .repository
            .list_by_status(&[TicketStatus::AwaitingConfirmation])
            .await?;
        let mut completed = Vec::new();
        for mut ticket in candidates {
            if !ticket.is_auto_complete_due(&*self.clock) {
                continue;
            }
            let expected = ticket.status();
            if let Err(err) = ticket.auto_complete(&*self.clock) {
                tracing::debug!(
                    ticket_id = %ticket.id(),
                    error = %err,
                    "skipping no-longer-due ticket during sweep",
                );
                continue;
            }
            match self.repository.update_transition(expected, &ticket).await {
                Ok(()) => {
                    self.emit(TicketEventKind::Updated, &ticket);
                    completed.push(ticket);
                }
                Err(TicketRepositoryError::StatusConflict { ticket_id, .. }) => {
                    tracing::debug!(
                        ticket_id = %ticket_id,
                        "ticket already swept by another client",
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(completed)
    }

    async fn load(&self, ticket_id: TicketId) -> TicketLifecycleResult<Ticket> {
        self.repository
            .find_by_id(ticket_id)
            .await?
            .ok_or(TicketLifecycleError::NotFound(ticket_id))
    }

    /// Best-effort event emission after an acknowledged write.
    fn emit(&self, kind: TicketEventKind, ticket: &Ticket) {
        let event = TicketEvent::new(kind, ticket.clone());
        match event.to_envelope_with_clock(&*self.clock) {
            Ok(envelope) => self.bus.emit(envelope),
            Err(err) => {
                tracing::warn!(
                    ticket_id = %ticket.id(),
                    kind = %kind,
                    error = %err,
                    "failed to encode ticket event",
                );
            }
        }
    }
}
