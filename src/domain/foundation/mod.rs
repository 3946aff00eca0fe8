//! Foundation value objects shared across the domain.

mod errors;
mod event_status;
mod ids;
mod state_machine;
mod ticket_status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use event_status::EventStatus;
pub use ids::{AttendeeId, EventId, ExternalUserId, StaffId, TicketId};
pub use state_machine::StateMachine;
pub use ticket_status::TicketStatus;
pub use timestamp::Timestamp;
