//! Ticket aggregate entity.
//!
//! A ticket references exactly one event and one attendee, is issued
//! Active, and is mutated at most once: either by the single check-in
//! transition, or by external revocation. Tickets are never deleted.
//!
//! # Invariants
//!
//! - `checked_in_at` is set at most once and is immutable afterwards
//! - a Revoked ticket never transitions to checked-in

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, EventId, StaffId, StateMachine, TicketId, TicketStatus,
    Timestamp,
};

use super::number::TicketNo;

/// Ticket aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier for this ticket.
    id: TicketId,

    /// Owning event.
    event_id: EventId,

    /// Owning attendee (one-to-one).
    attendee_id: AttendeeId,

    /// Human-readable number, unique within the event.
    ticket_no: TicketNo,

    /// Current status.
    status: TicketStatus,

    /// When the ticket was checked in, if ever.
    checked_in_at: Option<Timestamp>,

    /// Who performed the check-in, if any.
    checked_in_by: Option<StaffId>,

    /// When the ticket was issued.
    issued_at: Timestamp,
}

impl Ticket {
    /// Issue a new Active ticket.
    pub fn issue(
        id: TicketId,
        event_id: EventId,
        attendee_id: AttendeeId,
        ticket_no: TicketNo,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            attendee_id,
            ticket_no,
            status: TicketStatus::Active,
            checked_in_at: None,
            checked_in_by: None,
            issued_at,
        }
    }

    /// Reconstitute a ticket from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TicketId,
        event_id: EventId,
        attendee_id: AttendeeId,
        ticket_no: TicketNo,
        status: TicketStatus,
        checked_in_at: Option<Timestamp>,
        checked_in_by: Option<StaffId>,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            attendee_id,
            ticket_no,
            status,
            checked_in_at,
            checked_in_by,
            issued_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the ticket ID.
    pub fn id(&self) -> &TicketId {
        &self.id
    }

    /// Returns the owning event ID.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Returns the owning attendee ID.
    pub fn attendee_id(&self) -> &AttendeeId {
        &self.attendee_id
    }

    /// Returns the ticket number.
    pub fn ticket_no(&self) -> &TicketNo {
        &self.ticket_no
    }

    /// Returns the current status.
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the check-in instant, if the ticket was consumed.
    pub fn checked_in_at(&self) -> Option<&Timestamp> {
        self.checked_in_at.as_ref()
    }

    /// Returns who performed the check-in.
    pub fn checked_in_by(&self) -> Option<&StaffId> {
        self.checked_in_by.as_ref()
    }

    /// Returns when the ticket was issued.
    pub fn issued_at(&self) -> &Timestamp {
        &self.issued_at
    }

    /// True once the check-in instant is set.
    pub fn is_checked_in(&self) -> bool {
        self.checked_in_at.is_some()
    }

    /// True when the ticket belongs to the given event.
    pub fn belongs_to(&self, event_id: &EventId) -> bool {
        &self.event_id == event_id
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Consume the ticket: set the check-in instant and operator.
    ///
    /// This is the single mutation a ticket undergoes at the gate.
    ///
    /// # Errors
    ///
    /// - `TicketRevoked` if the ticket was revoked
    /// - `TicketAlreadyCheckedIn` if the instant is already set
    pub fn check_in(&mut self, at: Timestamp, by: StaffId) -> Result<(), DomainError> {
        if self.status == TicketStatus::Revoked {
            return Err(DomainError::new(
                ErrorCode::TicketRevoked,
                format!("Ticket {} has been revoked", self.ticket_no),
            ));
        }
        if self.checked_in_at.is_some() {
            return Err(DomainError::new(
                ErrorCode::TicketAlreadyCheckedIn,
                format!("Ticket {} already checked in", self.ticket_no),
            ));
        }

        self.checked_in_at = Some(at);
        self.checked_in_by = Some(by);
        Ok(())
    }

    /// Revoke the ticket (externally driven, terminal).
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already revoked
    pub fn revoke(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(TicketStatus::Revoked)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        Ok(())
    }
}
