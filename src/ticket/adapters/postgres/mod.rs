//! `PostgreSQL` adapters for ticket lifecycle persistence.

pub(crate) mod models;
pub(crate) mod repository;
mod schema;

pub use repository::{PostgresTicketRepository, TicketPgPool};
