//! Ticket repository port.
//!
//! The check-in write is a compare-and-set: the precondition "check-in
//! instant is currently null" must be checked and set atomically with
//! respect to concurrent attempts on the same ticket. Implementations
//! serialize concurrent writers (row lock or conditional update); the loser
//! observes `CheckInWrite::AlreadyCheckedIn` rather than overwriting the
//! winner's instant and operator.

use crate::domain::foundation::{AttendeeId, DomainError, StaffId, TicketId, Timestamp};
use crate::domain::ticket::Ticket;
use async_trait::async_trait;

/// Outcome of the atomic check-in write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInWrite {
    /// This caller set the check-in instant.
    Applied,
    /// The instant was already set by an earlier (or concurrent) check-in.
    AlreadyCheckedIn,
}

/// Repository port for Ticket aggregate persistence.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a freshly issued ticket.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, ticket: &Ticket) -> Result<(), DomainError>;

    /// Find a ticket by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError>;

    /// Find an attendee's active (non-revoked) ticket, if any.
    ///
    /// Used by the idempotent-ticket registration mode.
    async fn find_active_by_attendee(
        &self,
        attendee_id: &AttendeeId,
    ) -> Result<Option<Ticket>, DomainError>;

    /// Atomically set the check-in instant and operator if, and only if,
    /// the instant is currently unset.
    ///
    /// # Errors
    ///
    /// - `TicketNotFound` if the ticket does not exist
    /// - `DatabaseError` on persistence failure
    async fn record_check_in(
        &self,
        id: &TicketId,
        at: &Timestamp,
        by: &StaffId,
    ) -> Result<CheckInWrite, DomainError>;
}
