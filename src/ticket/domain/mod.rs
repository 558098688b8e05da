//! Domain model for ticket lifecycle management.
//!
//! The ticket domain models opening, claiming, fixing, confirming, and
//! abandoning support tickets while keeping all infrastructure concerns
//! outside of the domain boundary. Every state change is guarded by the
//! lifecycle transition table; callers observe violations as
//! [`TicketDomainError::InvalidTransition`] rather than silent no-ops.

mod error;
mod event;
mod ids;
mod projection;
mod status;
mod ticket;

pub use error::{ParseTicketStatusError, TicketDomainError, UnknownEventKindError};
pub use event::{TicketEvent, TicketEventKind, TicketEventListener, subscribe_ticket_listener};
pub use ids::{ProfileId, TicketId};
pub use projection::{StatusBucket, TicketListItem, project, project_with_names};
pub use status::TicketStatus;
pub use ticket::{PersistedTicketData, Ticket, TicketDraft};
