//! Port contracts for ticket lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by ticket services.

pub mod change_feed;
pub mod repository;

pub use change_feed::{
    ChangeFeedError, ChangeFeedResult, FeedScope, FeedSubscription, TicketChangeFeed,
    TicketFeedObserver,
};
pub use repository::{TicketRepository, TicketRepositoryError, TicketRepositoryResult};
