//! In-memory repository for ticket lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ticket::{
    domain::{ProfileId, Ticket, TicketId, TicketStatus},
    ports::{TicketRepository, TicketRepositoryError, TicketRepositoryResult},
};

/// Thread-safe in-memory ticket repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketRepository {
    state: Arc<RwLock<InMemoryTicketState>>,
}

#[derive(Debug, Default)]
struct InMemoryTicketState {
    tickets: HashMap<TicketId, Ticket>,
}

impl InMemoryTicketRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orders scan results by creation time so list operations are stable under
/// the hash map's arbitrary iteration order.
fn sorted_by_creation(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().into_inner().cmp(&b.id().into_inner()))
    });
    tickets
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn create(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::DuplicateTicket(ticket.id()));
        }
        state.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        let state = self.state.read().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.tickets.get(&id).cloned())
    }

    async fn list_by_status(
        &self,
        statuses: &[TicketStatus],
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let state = self.state.read().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let tickets = state
            .tickets
            .values()
            .filter(|ticket| statuses.contains(&ticket.status()))
            .cloned()
            .collect();
        Ok(sorted_by_creation(tickets))
    }

    async fn list_by_creator(&self, creator: ProfileId) -> TicketRepositoryResult<Vec<Ticket>> {
        let state = self.state.read().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let tickets = state
            .tickets
            .values()
            .filter(|ticket| ticket.created_by() == creator)
            .cloned()
            .collect();
        Ok(sorted_by_creation(tickets))
    }

    async fn list_by_assignee(&self, assignee: ProfileId) -> TicketRepositoryResult<Vec<Ticket>> {
        let state = self.state.read().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let tickets = state
            .tickets
            .values()
            .filter(|ticket| ticket.assigned_to() == Some(assignee))
            .cloned()
            .collect();
        Ok(sorted_by_creation(tickets))
    }

    async fn update_transition(
        &self,
        expected_status: TicketStatus,
        ticket: &Ticket,
    ) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .tickets
            .get_mut(&ticket.id())
            .ok_or(TicketRepositoryError::NotFound(ticket.id()))?;
        if stored.status() != expected_status {
            return Err(TicketRepositoryError::StatusConflict {
                ticket_id: ticket.id(),
                expected: expected_status,
                actual: stored.status(),
            });
        }
        *stored = ticket.clone();
        Ok(())
    }

    async fn clear(&self) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.tickets.clear();
        Ok(())
    }
}
