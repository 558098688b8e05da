//! Pure read-model projection for ticket list views.
//!
//! Projection never touches I/O or the clock; callers supply the tickets
//! and the instant to measure elapsed time against.

use super::{ProfileId, Ticket, TicketId, TicketStatus};
use chrono::{DateTime, TimeDelta, Utc};

/// Display bucket grouping lifecycle statuses for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    /// Unclaimed tickets.
    New,
    /// Claimed tickets, including those awaiting confirmation.
    Active,
    /// Terminally closed tickets.
    Completed,
}

impl StatusBucket {
    /// Returns the statuses belonging to this bucket.
    #[must_use]
    pub const fn statuses(self) -> &'static [TicketStatus] {
        match self {
            Self::New => &[TicketStatus::Waiting],
            Self::Active => &[TicketStatus::InProgress, TicketStatus::AwaitingConfirmation],
            Self::Completed => &[TicketStatus::Completed, TicketStatus::AutoCompleted],
        }
    }

    /// Returns true when `status` belongs to this bucket.
    #[must_use]
    pub const fn contains(self, status: TicketStatus) -> bool {
        matches!(
            (self, status),
            (Self::New, TicketStatus::Waiting)
                | (
                    Self::Active,
                    TicketStatus::InProgress | TicketStatus::AwaitingConfirmation
                )
                | (
                    Self::Completed,
                    TicketStatus::Completed | TicketStatus::AutoCompleted
                )
        )
    }
}

/// Read-only list entry projected from a ticket.
///
/// Never persisted; recomputed per render from current ticket state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketListItem {
    /// Projected ticket identifier.
    pub ticket_id: TicketId,
    /// Lifecycle status at projection time.
    pub status: TicketStatus,
    /// Ticket summary.
    pub summary: String,
    /// Customer's free-form time estimate, if any.
    pub estimated_time: Option<String>,
    /// Profile that opened the ticket.
    pub created_by: ProfileId,
    /// Assigned engineer, if any.
    pub assigned_to: Option<ProfileId>,
    /// Display name for the assignee, when a resolver supplied one.
    pub assignee_name: Option<String>,
    /// Timestamp the bucket ordering used for this entry.
    pub sorted_at: DateTime<Utc>,
    /// Claim-to-resolution time, or claim-to-now while unresolved.
    /// `None` before the ticket is first claimed.
    pub elapsed: Option<TimeDelta>,
}

/// Projects tickets into a bucketed, newest-first list.
///
/// Entries are ordered by the bucket's sort key descending (`New`: creation,
/// `Active`: claim, `Completed`: resolution), with ties broken by ticket
/// identifier so equal timestamps still order deterministically.
#[must_use]
pub fn project(
    tickets: &[Ticket],
    bucket: StatusBucket,
    now: DateTime<Utc>,
) -> Vec<TicketListItem> {
    project_with_names(tickets, bucket, now, |_| None)
}

/// Projects tickets into a bucketed list, resolving assignee display names
/// through the supplied lookup.
///
/// The resolver is only consulted for assigned tickets and must be pure.
#[must_use]
pub fn project_with_names(
    tickets: &[Ticket],
    bucket: StatusBucket,
    now: DateTime<Utc>,
    resolve_name: impl Fn(ProfileId) -> Option<String>,
) -> Vec<TicketListItem> {
    let mut items: Vec<TicketListItem> = tickets
        .iter()
        .filter(|ticket| bucket.contains(ticket.status()))
        .map(|ticket| to_list_item(ticket, bucket, now, &resolve_name))
        .collect();

    items.sort_by(|a, b| {
        b.sorted_at
            .cmp(&a.sorted_at)
            .then_with(|| a.ticket_id.into_inner().cmp(&b.ticket_id.into_inner()))
    });
    items
}

fn to_list_item(
    ticket: &Ticket,
    bucket: StatusBucket,
    now: DateTime<Utc>,
    resolve_name: &impl Fn(ProfileId) -> Option<String>,
) -> TicketListItem {
    TicketListItem {
        ticket_id: ticket.id(),
        status: ticket.status(),
        summary: ticket.summary().to_owned(),
        estimated_time: ticket.estimated_time().map(str::to_owned),
        created_by: ticket.created_by(),
        assigned_to: ticket.assigned_to(),
        assignee_name: ticket.assigned_to().and_then(resolve_name),
        sorted_at: sort_key(ticket, bucket),
        elapsed: elapsed_since_claim(ticket, now),
    }
}

/// Returns the bucket sort timestamp, falling back to creation time when the
/// bucket's preferred timestamp is absent.
fn sort_key(ticket: &Ticket, bucket: StatusBucket) -> DateTime<Utc> {
    match bucket {
        StatusBucket::New => ticket.created_at(),
        StatusBucket::Active => ticket.claimed_at().unwrap_or_else(|| ticket.created_at()),
        StatusBucket::Completed => ticket.resolved_at().unwrap_or_else(|| ticket.created_at()),
    }
}

fn elapsed_since_claim(ticket: &Ticket, now: DateTime<Utc>) -> Option<TimeDelta> {
    let claimed_at = ticket.claimed_at()?;
    let end = ticket.resolved_at().unwrap_or(now);
    Some(end - claimed_at)
}
