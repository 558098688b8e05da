//! Infrastructure adapters for the ticket module.
//!
//! Adapters implement the ticket ports against concrete infrastructure
//! while the domain stays pure:
//!
//! - [`memory`]: thread-safe in-memory repository and change-feed hub for
//!   tests and single-process compositions
//! - [`postgres`]: production persistence using Diesel ORM over a pooled
//!   `PostgreSQL` connection

pub mod memory;
pub mod postgres;
