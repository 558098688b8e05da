//! Application services for ticket lifecycle orchestration.

mod feed_bridge;
mod lifecycle;

pub use feed_bridge::ChangeFeedBridge;
pub use lifecycle::{
    AutoCompletePolicy, OpenTicketRequest, TicketLifecycleError, TicketLifecycleResult,
    TicketLifecycleService,
};
