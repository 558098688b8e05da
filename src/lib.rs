//! Triage: customer support ticket lifecycle management.
//!
//! This crate tracks support tickets from the moment a customer opens one
//! until it is resolved, either by explicit customer confirmation or by a
//! timed auto-completion when the customer never responds. Engineers claim
//! tickets from a shared waiting queue, mark them fixed, and hand them back
//! for confirmation; every step is validated by the domain state machine
//! and announced on an event bus so list views and sibling instances stay
//! current without polling.
//!
//! # Architecture
//!
//! Triage follows hexagonal architecture principles:
//!
//! - **Domain**: Pure lifecycle rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and change feeds
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`bus`]: Domain-agnostic publish/subscribe event bus with an
//!   in-process relay between bus instances
//! - [`ticket`]: Ticket domain, persistence ports and adapters, lifecycle
//!   orchestration, and the status-bucketed list projection

pub mod bus;
pub mod ticket;
