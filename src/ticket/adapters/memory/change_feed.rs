//! In-memory change-feed hub for tests and single-process compositions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::ticket::domain::Ticket;
use crate::ticket::ports::{
    ChangeFeedResult, FeedScope, FeedSubscription, TicketChangeFeed, TicketFeedObserver,
};

#[derive(Clone)]
struct ObserverEntry {
    id: u64,
    scope: FeedScope,
    observer: Arc<dyn TicketFeedObserver>,
}

#[derive(Default)]
struct HubState {
    next_observer_id: AtomicU64,
    observers: RwLock<Vec<ObserverEntry>>,
}

/// In-memory change-feed hub.
///
/// The producing side calls [`InMemoryChangeFeedHub::publish_insert`] and
/// [`InMemoryChangeFeedHub::publish_update`] after store writes; the
/// consuming side subscribes through the [`TicketChangeFeed`] port. The hub
/// delivers snapshots exactly as published and makes no dedupe or ordering
/// promises, matching the at-least-once contract of a real feed.
#[derive(Clone, Default)]
pub struct InMemoryChangeFeedHub {
    state: Arc<HubState>,
}

impl InMemoryChangeFeedHub {
    /// Creates a hub with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers an inserted row snapshot to every observer whose scope
    /// covers the ticket.
    pub fn publish_insert(&self, ticket: &Ticket) {
        for entry in self.matching(ticket) {
            entry.observer.on_insert(ticket);
        }
    }

    /// Delivers an updated row snapshot to every observer whose scope
    /// covers the ticket.
    pub fn publish_update(&self, ticket: &Ticket) {
        for entry in self.matching(ticket) {
            entry.observer.on_update(ticket);
        }
    }

    /// Returns how many observers are currently subscribed.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshots the observers covering the ticket so callbacks run without
    /// the registry lock held.
    fn matching(&self, ticket: &Ticket) -> Vec<ObserverEntry> {
        self.state
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.scope.covers(ticket.id()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TicketChangeFeed for InMemoryChangeFeedHub {
    async fn subscribe(
        &self,
        scope: FeedScope,
        observer: Arc<dyn TicketFeedObserver>,
    ) -> ChangeFeedResult<FeedSubscription> {
        let id = self.state.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.state
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ObserverEntry {
                id,
                scope,
                observer,
            });
        let state = Arc::downgrade(&self.state);
        Ok(FeedSubscription::new(move || {
            if let Some(hub) = state.upgrade() {
                hub.observers
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|entry| entry.id != id);
            }
        }))
    }
}

impl fmt::Debug for InMemoryChangeFeedHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryChangeFeedHub")
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}
