//! Ticket aggregate and its value objects.

mod aggregate;
mod number;

pub use aggregate::Ticket;
pub use number::{TicketNo, MAX_TICKET_NO_LENGTH};
