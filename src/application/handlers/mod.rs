//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod check_in_ticket;
pub mod create_event;
pub mod find_event;
pub mod register_attendee;

pub use check_in_ticket::{
    CheckInError, CheckInOutcome, CheckInTicketCommand, CheckInTicketHandler,
};
pub use create_event::{CreateEventCommand, CreateEventError, CreateEventHandler};
pub use find_event::{FindEventError, FindEventHandler, FoundEvent};
pub use register_attendee::{
    IssuedTicket, RegisterAttendeeCommand, RegisterAttendeeHandler, RegistrationError,
};
