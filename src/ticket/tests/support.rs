//! Shared fixtures for ticket unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::ticket::domain::{ProfileId, Ticket, TicketDraft};

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Deterministic base instant for lifecycle tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid base timestamp")
}

/// Opens a waiting ticket with fixed content at the given instant.
pub fn waiting_ticket_at(at: DateTime<Utc>) -> Ticket {
    let draft = TicketDraft::new("Printer offline", "The office printer rejects every job.")
        .expect("fixture draft is valid");
    Ticket::open(draft, ProfileId::new(), &FixedClock(at))
}
