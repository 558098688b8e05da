//! Bridges the persistence change feed onto the event bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::bus::EventBus;
use crate::ticket::domain::{Ticket, TicketEvent, TicketEventKind, TicketId};
use crate::ticket::ports::{
    ChangeFeedResult, FeedScope, FeedSubscription, TicketChangeFeed, TicketFeedObserver,
};

/// Re-publishes ticket row changes as bus events.
///
/// The feed delivers at-least-once and possibly out of order, so the bridge
/// keeps a per-ticket high-water mark on `updated_at` and drops snapshots
/// at or below it; first sight of a ticket always passes. Inserts forward
/// as `ticket-created` and updates as `ticket-updated`. The precise
/// claim/abandon kinds come from the lifecycle service's own emissions; the
/// bridge is the coarse echo for writes made by other processes.
#[derive(Debug)]
pub struct ChangeFeedBridge {
    _subscription: FeedSubscription,
}

impl ChangeFeedBridge {
    /// Subscribes to the feed and forwards changes until the bridge drops.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ticket::ports::ChangeFeedError::Subscription`] when
    /// the feed refuses the subscription.
    pub async fn start<F, B>(feed: &F, bus: Arc<B>, scope: FeedScope) -> ChangeFeedResult<Self>
    where
        F: TicketChangeFeed + ?Sized,
        B: EventBus + 'static,
    {
        let observer = Arc::new(DedupingObserver {
            bus,
            high_water: Mutex::new(HashMap::new()),
        });
        let subscription = feed.subscribe(scope, observer).await?;
        Ok(Self {
            _subscription: subscription,
        })
    }
}

struct DedupingObserver<B: EventBus> {
    bus: Arc<B>,
    high_water: Mutex<HashMap<TicketId, DateTime<Utc>>>,
}

impl<B: EventBus> DedupingObserver<B> {
    /// Returns whether the snapshot advances the ticket's high-water mark.
    /// Duplicates and stale out-of-order deliveries do not.
    fn advances(&self, id: TicketId, updated_at: DateTime<Utc>) -> bool {
        let mut marks = self
            .high_water
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match marks.get(&id) {
            Some(mark) if updated_at <= *mark => false,
            _ => {
                marks.insert(id, updated_at);
                true
            }
        }
    }

    fn forward(&self, kind: TicketEventKind, ticket: &Ticket) {
        if !self.advances(ticket.id(), ticket.updated_at()) {
            tracing::debug!(
                ticket_id = %ticket.id(),
                "dropping duplicate or stale feed snapshot",
            );
            return;
        }
        let event = TicketEvent::new(kind, ticket.clone());
        match event.to_envelope() {
            Ok(envelope) => self.bus.emit(envelope),
            Err(err) => {
                tracing::warn!(
                    ticket_id = %ticket.id(),
                    error = %err,
                    "failed to encode feed snapshot",
                );
            }
        }
    }
}

impl<B: EventBus> TicketFeedObserver for DedupingObserver<B> {
    fn on_insert(&self, ticket: &Ticket) {
        self.forward(TicketEventKind::Created, ticket);
    }

    fn on_update(&self, ticket: &Ticket) {
        self.forward(TicketEventKind::Updated, ticket);
    }
}
