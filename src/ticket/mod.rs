//! Support ticket lifecycle management.
//!
//! This module models the full life of a customer support ticket: opening,
//! claiming, fixing, customer confirmation or rejection, abandonment, and
//! timed auto-completion when the customer never responds. Every state
//! change is validated by the domain transition table, persisted through a
//! status-guarded write so concurrent clients resolve races cleanly, and
//! announced on the event bus. The module follows hexagonal architecture:
//!
//! - Domain types and the list projection in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
