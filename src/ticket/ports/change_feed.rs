//! Change-feed port for observing ticket rows as the store mutates.
//!
//! The feed reports what persistence did, not what the domain decided: an
//! observer sees inserts and updates in store order, including writes made
//! by other processes sharing the same store. Consumers that need domain
//! events translate feed rows through the bridge in the services layer.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::ticket::domain::{Ticket, TicketId};

/// Result type for change-feed operations.
pub type ChangeFeedResult<T> = Result<T, ChangeFeedError>;

/// Rows a change-feed subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every ticket row.
    All,
    /// Only the row for one ticket.
    Ticket(TicketId),
}

impl FeedScope {
    /// Returns whether a change to the given ticket falls inside the scope.
    #[must_use]
    pub fn covers(&self, id: TicketId) -> bool {
        match self {
            Self::All => true,
            Self::Ticket(scoped) => *scoped == id,
        }
    }
}

/// Consumer-side hooks for ticket row changes.
///
/// Both hooks are infallible; an observer that cannot keep up drops or
/// queues changes on its own side.
pub trait TicketFeedObserver: Send + Sync {
    /// Invoked when a ticket row is inserted.
    fn on_insert(&self, ticket: &Ticket);

    /// Invoked when a ticket row is updated.
    fn on_update(&self, ticket: &Ticket);
}

/// Contract for subscribing to ticket row changes.
#[async_trait]
pub trait TicketChangeFeed: Send + Sync {
    /// Registers an observer for changes within the given scope.
    ///
    /// The observer stays registered for the lifetime of the returned
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeFeedError::Subscription`] when the feed cannot be
    /// established.
    async fn subscribe(
        &self,
        scope: FeedScope,
        observer: Arc<dyn TicketFeedObserver>,
    ) -> ChangeFeedResult<FeedSubscription>;
}

/// Subscription handle that detaches its observer on drop.
#[must_use = "dropping the subscription detaches the observer"]
pub struct FeedSubscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl FeedSubscription {
    /// Creates a subscription running `detach` exactly once when dropped.
    ///
    /// Feed implementations supply the hook that removes the observer from
    /// their registry.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// Errors returned by change-feed implementations.
#[derive(Debug, Clone, Error)]
pub enum ChangeFeedError {
    /// The subscription could not be established.
    #[error("change feed subscription failed: {0}")]
    Subscription(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChangeFeedError {
    /// Wraps a subscription failure.
    pub fn subscription(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Subscription(Arc::new(err))
    }
}
