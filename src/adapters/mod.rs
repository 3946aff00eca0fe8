//! Adapters - Implementations of ports against real infrastructure.

pub mod memory;
pub mod postgres;
pub mod telegram;

pub use memory::{
    InMemoryAttendeeRepository, InMemoryEventRepository, InMemoryTicketRepository,
    RecordingNotifier,
};
pub use postgres::{
    connect, PostgresAttendeeRepository, PostgresEventRepository, PostgresTicketRepository,
};
pub use telegram::TelegramNotifier;
