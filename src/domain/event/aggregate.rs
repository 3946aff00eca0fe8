//! Event aggregate entity.
//!
//! An event owns zero-or-more attendees and zero-or-more tickets (by
//! reference; the owned entities live in their own modules). The aggregate
//! also carries the gate rules used by registration and check-in: whether
//! the event accepts registrations, and whether an instant falls inside the
//! event's check-in window.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, EventStatus, StateMachine, Timestamp,
};

use super::code::EventCode;

/// Maximum length for event title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for event description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Event aggregate.
///
/// # Invariants
///
/// - `end_at >= start_at`
/// - `code` is generated once and never mutated
/// - `title` is 1-200 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    id: EventId,

    /// Immutable human-facing code.
    code: EventCode,

    /// Event title.
    title: String,

    /// Optional description.
    description: Option<String>,

    /// Optional venue or location hint.
    location: Option<String>,

    /// Start of the check-in window.
    start_at: Timestamp,

    /// End of the check-in window.
    end_at: Timestamp,

    /// Current status.
    status: EventStatus,

    /// When the event was created.
    created_at: Timestamp,
}

impl Event {
    /// Create a new event.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the title is empty/too long or the window is
    ///   inverted (`end_at` before `start_at`)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EventId,
        code: EventCode,
        title: String,
        description: Option<String>,
        location: Option<String>,
        start_at: Timestamp,
        end_at: Timestamp,
        status: EventStatus,
    ) -> Result<Self, DomainError> {
        Self::validate_title(&title)?;
        Self::validate_window(&start_at, &end_at)?;
        if let Some(desc) = &description {
            if desc.len() > MAX_DESCRIPTION_LENGTH {
                return Err(DomainError::validation(
                    "description",
                    format!("Description must be {} characters or less", MAX_DESCRIPTION_LENGTH),
                ));
            }
        }

        Ok(Self {
            id,
            code,
            title,
            description,
            location,
            start_at,
            end_at,
            status,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute an event from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: EventId,
        code: EventCode,
        title: String,
        description: Option<String>,
        location: Option<String>,
        start_at: Timestamp,
        end_at: Timestamp,
        status: EventStatus,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            code,
            title,
            description,
            location,
            start_at,
            end_at,
            status,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the event ID.
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// Returns the human-facing code.
    pub fn code(&self) -> &EventCode {
        &self.code
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the location.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the start of the check-in window.
    pub fn start_at(&self) -> &Timestamp {
        &self.start_at
    }

    /// Returns the end of the check-in window.
    pub fn end_at(&self) -> &Timestamp {
        &self.end_at
    }

    /// Returns the current status.
    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Returns when the event was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────
    // Gate rules
    // ─────────────────────────────────────────────────────────────────────

    /// True unless the event is Closed.
    pub fn is_open_for_registration(&self) -> bool {
        self.status.accepts_registration()
    }

    /// True when `at` falls inside `[start_at, end_at]`, inclusive on both
    /// bounds.
    pub fn is_within_window(&self, at: &Timestamp) -> bool {
        !at.is_before(&self.start_at) && !at.is_after(&self.end_at)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations (externally driven status changes)
    // ─────────────────────────────────────────────────────────────────────

    /// Publish a draft event.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if not currently Draft
    pub fn publish(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(EventStatus::Published)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        Ok(())
    }

    /// Close the event. Registration is refused afterwards.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already Closed
    pub fn close(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(EventStatus::Closed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────

    fn validate_title(title: &str) -> Result<(), DomainError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }
        if trimmed.len() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Title must be {} characters or less", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }

    fn validate_window(start_at: &Timestamp, end_at: &Timestamp) -> Result<(), DomainError> {
        if end_at.is_before(start_at) {
            return Err(DomainError::validation(
                "end_at",
                "Event end must not be before its start",
            ));
        }
        Ok(())
    }
}
