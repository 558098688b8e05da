//! Shared world state for ticket lifecycle BDD scenarios.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use eyre::WrapErr;
use mockable::Clock;
use rstest::fixture;
use triage::bus::LocalBus;
use triage::ticket::{
    adapters::memory::InMemoryTicketRepository,
    domain::{ProfileId, Ticket, TicketId},
    services::{AutoCompletePolicy, TicketLifecycleError, TicketLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTicketService =
    TicketLifecycleService<InMemoryTicketRepository, LocalBus, ManualClock>;

/// Clock pinned to a starting instant that moves only when a step advances it.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock reading `start` until advanced.
    #[must_use]
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.write().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock")
    }
}

/// Scenario world for ticket lifecycle behaviour tests.
pub struct TicketWorld {
    /// The lifecycle service under test.
    pub service: TestTicketService,
    /// Clock shared with the service, advanced by window-lapse steps.
    pub clock: Arc<ManualClock>,
    /// Customer who opens the scenario ticket.
    pub customer: ProfileId,
    /// Engineer who claims the scenario ticket.
    pub engineer: ProfileId,
    /// Ticket opened by the background step.
    pub ticket_id: Option<TicketId>,
    /// Result of the last contested claim attempt.
    pub last_claim_result: Option<Result<Ticket, TicketLifecycleError>>,
}

impl TicketWorld {
    /// Creates a world with a fresh in-memory lifecycle stack.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
                .single()
                .expect("valid base timestamp"),
        ));
        let service = TicketLifecycleService::new(
            Arc::new(InMemoryTicketRepository::new()),
            Arc::new(LocalBus::new()),
            Arc::clone(&clock),
            AutoCompletePolicy::default(),
        );

        Self {
            service,
            clock,
            customer: ProfileId::new(),
            engineer: ProfileId::new(),
            ticket_id: None,
            last_claim_result: None,
        }
    }

    /// Loads the scenario ticket's current persisted snapshot.
    pub fn current_ticket(&self) -> Result<Ticket, eyre::Report> {
        let ticket_id = self
            .ticket_id
            .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
        run_async(self.service.find_ticket(ticket_id))
            .wrap_err("load ticket for assertion")?
            .ok_or_else(|| eyre::eyre!("ticket missing from the store"))
    }
}

impl Default for TicketWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TicketWorld {
    TicketWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
