//! Diesel row models for ticket persistence.

use super::schema::tickets;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for ticket records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    /// Ticket identifier.
    pub id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// One-line summary shown in list views.
    pub summary: String,
    /// Customer's free-form problem description.
    pub problem_description: String,
    /// Customer's free-form time estimate.
    pub estimated_time: Option<String>,
    /// Profile that opened the ticket.
    pub created_by: uuid::Uuid,
    /// Profile currently assigned, if any.
    pub assigned_to: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Claim timestamp, if claimed.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Mark-as-fixed timestamp, if pending confirmation.
    pub marked_as_fixed_at: Option<DateTime<Utc>>,
    /// Terminal resolution timestamp, if resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Auto-complete deadline, if armed.
    pub auto_complete_timeout_at: Option<DateTime<Utc>>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for ticket records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicketRow {
    /// Ticket identifier.
    pub id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// One-line summary shown in list views.
    pub summary: String,
    /// Customer's free-form problem description.
    pub problem_description: String,
    /// Customer's free-form time estimate.
    pub estimated_time: Option<String>,
    /// Profile that opened the ticket.
    pub created_by: uuid::Uuid,
    /// Profile currently assigned, if any.
    pub assigned_to: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Claim timestamp, if claimed.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Mark-as-fixed timestamp, if pending confirmation.
    pub marked_as_fixed_at: Option<DateTime<Utc>>,
    /// Terminal resolution timestamp, if resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Auto-complete deadline, if armed.
    pub auto_complete_timeout_at: Option<DateTime<Utc>>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model applied by status-guarded transition writes.
///
/// Covers only the columns a lifecycle transition may change; identity,
/// authorship, and customer-entered content stay immutable after insert.
/// `None` writes SQL `NULL` so withdrawn timestamps clear properly.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(treat_none_as_null = true)]
pub struct TicketChangeset {
    /// Lifecycle status after the transition.
    pub status: String,
    /// Assignee after the transition, if any.
    pub assigned_to: Option<uuid::Uuid>,
    /// Claim timestamp after the transition, if any.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Mark-as-fixed timestamp after the transition, if any.
    pub marked_as_fixed_at: Option<DateTime<Utc>>,
    /// Resolution timestamp after the transition, if any.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Auto-complete deadline after the transition, if any.
    pub auto_complete_timeout_at: Option<DateTime<Utc>>,
    /// Lifecycle timestamp after the transition.
    pub updated_at: DateTime<Utc>,
}
