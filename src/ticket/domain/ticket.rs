//! Ticket aggregate root and lifecycle operations.

use super::{ProfileId, TicketDomainError, TicketId, TicketStatus};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated payload for opening a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    summary: String,
    problem_description: String,
    estimated_time: Option<String>,
}

impl TicketDraft {
    /// Creates a draft with the required customer-facing fields.
    ///
    /// Both fields are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptySummary`] or
    /// [`TicketDomainError::EmptyProblemDescription`] when the respective
    /// field is empty after trimming.
    pub fn new(
        summary: impl Into<String>,
        problem_description: impl Into<String>,
    ) -> Result<Self, TicketDomainError> {
        let raw_summary = summary.into();
        let trimmed_summary = raw_summary.trim();
        if trimmed_summary.is_empty() {
            return Err(TicketDomainError::EmptySummary);
        }

        let raw_description = problem_description.into();
        let trimmed_description = raw_description.trim();
        if trimmed_description.is_empty() {
            return Err(TicketDomainError::EmptyProblemDescription);
        }

        Ok(Self {
            summary: trimmed_summary.to_owned(),
            problem_description: trimmed_description.to_owned(),
            estimated_time: None,
        })
    }

    /// Sets the customer's free-form time estimate.
    ///
    /// Blank estimates collapse to `None`.
    #[must_use]
    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        let raw = estimated_time.into();
        let normalized = raw.trim();
        self.estimated_time = (!normalized.is_empty()).then_some(normalized.to_owned());
        self
    }

    /// Returns the trimmed summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the trimmed problem description.
    #[must_use]
    pub fn problem_description(&self) -> &str {
        &self.problem_description
    }

    /// Returns the normalized time estimate, if any.
    #[must_use]
    pub fn estimated_time(&self) -> Option<&str> {
        self.estimated_time.as_deref()
    }
}

/// Support ticket aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    status: TicketStatus,
    summary: String,
    problem_description: String,
    estimated_time: Option<String>,
    created_by: ProfileId,
    assigned_to: Option<ProfileId>,
    created_at: DateTime<Utc>,
    claimed_at: Option<DateTime<Utc>>,
    marked_as_fixed_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    auto_complete_timeout_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted ticket aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTicketData {
    /// Persisted ticket identifier.
    pub id: TicketId,
    /// Persisted lifecycle status.
    pub status: TicketStatus,
    /// Persisted summary.
    pub summary: String,
    /// Persisted problem description.
    pub problem_description: String,
    /// Persisted time estimate, if any.
    pub estimated_time: Option<String>,
    /// Persisted creator profile.
    pub created_by: ProfileId,
    /// Persisted assignee profile, if any.
    pub assigned_to: Option<ProfileId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted claim timestamp, if any.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Persisted mark-as-fixed timestamp, if any.
    pub marked_as_fixed_at: Option<DateTime<Utc>>,
    /// Persisted resolution timestamp, if any.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Persisted auto-complete deadline, if any.
    pub auto_complete_timeout_at: Option<DateTime<Utc>>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Opens a new ticket from a validated draft.
    ///
    /// The ticket starts in [`TicketStatus::Waiting`] with no assignee.
    #[must_use]
    pub fn open(draft: TicketDraft, created_by: ProfileId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TicketId::new(),
            status: TicketStatus::Waiting,
            summary: draft.summary,
            problem_description: draft.problem_description,
            estimated_time: draft.estimated_time,
            created_by,
            assigned_to: None,
            created_at: timestamp,
            claimed_at: None,
            marked_as_fixed_at: None,
            resolved_at: None,
            auto_complete_timeout_at: None,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a ticket from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTicketData) -> Self {
        debug_assert!(
            data.assigned_to.is_some() == data.claimed_at.is_some(),
            "claimed_at must be set exactly when assigned_to is set"
        );
        debug_assert!(
            (data.status == TicketStatus::Waiting) == data.assigned_to.is_none(),
            "assigned_to must be set exactly when the ticket has left the waiting queue"
        );
        debug_assert!(
            data.auto_complete_timeout_at.is_none()
                || data.status == TicketStatus::AwaitingConfirmation,
            "auto-complete deadline is only held while awaiting confirmation"
        );

        Self {
            id: data.id,
            status: data.status,
            summary: data.summary,
            problem_description: data.problem_description,
            estimated_time: data.estimated_time,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            created_at: data.created_at,
            claimed_at: data.claimed_at,
            marked_as_fixed_at: data.marked_as_fixed_at,
            resolved_at: data.resolved_at,
            auto_complete_timeout_at: data.auto_complete_timeout_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the ticket identifier.
    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the ticket summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the customer's problem description.
    #[must_use]
    pub fn problem_description(&self) -> &str {
        &self.problem_description
    }

    /// Returns the customer's free-form time estimate, if any.
    #[must_use]
    pub fn estimated_time(&self) -> Option<&str> {
        self.estimated_time.as_deref()
    }

    /// Returns the profile that opened the ticket.
    #[must_use]
    pub const fn created_by(&self) -> ProfileId {
        self.created_by
    }

    /// Returns the engineer currently assigned, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<ProfileId> {
        self.assigned_to
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the current assignee claimed the ticket, if claimed.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns when the engineer last marked the ticket fixed, if pending.
    #[must_use]
    pub const fn marked_as_fixed_at(&self) -> Option<DateTime<Utc>> {
        self.marked_as_fixed_at
    }

    /// Returns when the ticket reached a terminal status, if it has.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns the auto-complete deadline, present only while the ticket is
    /// awaiting confirmation.
    #[must_use]
    pub const fn auto_complete_timeout_at(&self) -> Option<DateTime<Utc>> {
        self.auto_complete_timeout_at
    }

    /// Returns the latest lifecycle timestamp.
    ///
    /// Every successful transition advances this value; change-feed
    /// consumers dedupe snapshots on the `(id, updated_at)` pair.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true when the ticket is awaiting confirmation and its
    /// auto-complete deadline has passed.
    #[must_use]
    pub fn is_auto_complete_due(&self, clock: &impl Clock) -> bool {
        self.status == TicketStatus::AwaitingConfirmation
            && self
                .auto_complete_timeout_at
                .is_some_and(|deadline| clock.utc() >= deadline)
    }

    /// Assigns the ticket to an engineer and starts work.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// waiting.
    pub fn claim(
        &mut self,
        engineer: ProfileId,
        clock: &impl Clock,
    ) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::Waiting, TicketStatus::InProgress)?;
        let now = clock.utc();
        self.status = TicketStatus::InProgress;
        self.assigned_to = Some(engineer);
        self.claimed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Records the engineer's belief that the problem is fixed and arms the
    /// auto-complete deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// in progress, or [`TicketDomainError::DeadlineOutOfRange`] when the
    /// grace period overflows the representable timestamp range.
    pub fn mark_as_fixed(
        &mut self,
        grace: TimeDelta,
        clock: &impl Clock,
    ) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::InProgress, TicketStatus::AwaitingConfirmation)?;
        let now = clock.utc();
        let deadline = now
            .checked_add_signed(grace)
            .ok_or(TicketDomainError::DeadlineOutOfRange(self.id))?;
        self.status = TicketStatus::AwaitingConfirmation;
        self.marked_as_fixed_at = Some(now);
        self.auto_complete_timeout_at = Some(deadline);
        self.updated_at = now;
        Ok(())
    }

    /// Records the customer's confirmation and completes the ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// awaiting confirmation.
    pub fn confirm_resolved(&mut self, clock: &impl Clock) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::AwaitingConfirmation, TicketStatus::Completed)?;
        let now = clock.utc();
        self.status = TicketStatus::Completed;
        self.resolved_at = Some(now);
        self.auto_complete_timeout_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Records the customer's rejection of the fix and returns the ticket to
    /// the assignee's queue.
    ///
    /// The assignee is kept; only the fix claim and its deadline are
    /// withdrawn.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// awaiting confirmation.
    pub fn mark_still_broken(&mut self, clock: &impl Clock) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::AwaitingConfirmation, TicketStatus::InProgress)?;
        self.status = TicketStatus::InProgress;
        self.marked_as_fixed_at = None;
        self.auto_complete_timeout_at = None;
        self.touch(clock);
        Ok(())
    }

    /// Completes the ticket after the confirmation window lapsed without a
    /// customer response.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// awaiting confirmation and its deadline has passed.
    pub fn auto_complete(&mut self, clock: &impl Clock) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::AwaitingConfirmation, TicketStatus::AutoCompleted)?;
        let now = clock.utc();
        let due = self
            .auto_complete_timeout_at
            .is_some_and(|deadline| now >= deadline);
        if !due {
            return Err(TicketDomainError::invalid_transition(
                self.id,
                self.status,
                TicketStatus::AutoCompleted,
            ));
        }
        self.status = TicketStatus::AutoCompleted;
        self.resolved_at = Some(now);
        self.auto_complete_timeout_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Releases the ticket back to the waiting queue.
    ///
    /// Clears the assignee and claim timestamp so another engineer can
    /// claim it.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTransition`] unless the ticket is
    /// in progress.
    pub fn abandon(&mut self, clock: &impl Clock) -> Result<(), TicketDomainError> {
        self.guard(TicketStatus::InProgress, TicketStatus::Waiting)?;
        self.status = TicketStatus::Waiting;
        self.assigned_to = None;
        self.claimed_at = None;
        self.touch(clock);
        Ok(())
    }

    /// Validates that the ticket currently holds the status the operation
    /// departs from, without mutating the ticket.
    ///
    /// Operations pin their departure status rather than consulting the
    /// transition matrix alone: two operations may share a target status
    /// (claim and mark-still-broken both land on in-progress) while being
    /// legal from different departure statuses.
    fn guard(&self, from: TicketStatus, to: TicketStatus) -> Result<(), TicketDomainError> {
        debug_assert!(
            from.can_transition_to(to),
            "operation guards must pin a legal lifecycle edge"
        );
        if self.status != from {
            return Err(TicketDomainError::invalid_transition(self.id, self.status, to));
        }
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
