//! In-memory adapters for tests and single-process compositions.

pub mod change_feed;
pub mod repository;

pub use change_feed::InMemoryChangeFeedHub;
pub use repository::InMemoryTicketRepository;
