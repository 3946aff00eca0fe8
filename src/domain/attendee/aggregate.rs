//! Attendee aggregate entity.
//!
//! An attendee belongs to exactly one event. The pair
//! (event, external user id) is unique; the storage constraint on that pair
//! is the authoritative guard behind registration idempotency.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendeeId, DomainError, EventId, ExternalUserId, Timestamp,
};

/// Maximum length for an attendee's full name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Attendee aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Unique identifier for this attendee.
    id: AttendeeId,

    /// Owning event.
    event_id: EventId,

    /// Messaging-platform identity, unique within the event.
    external_user_id: ExternalUserId,

    /// Display name.
    full_name: String,

    /// Optional contact phone.
    phone: Option<String>,

    /// Optional contact email.
    email: Option<String>,

    /// Optional company affiliation.
    company: Option<String>,

    /// When the attendee registered.
    created_at: Timestamp,
}

impl Attendee {
    /// Create a new attendee for an event.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the name is empty or too long
    pub fn new(
        id: AttendeeId,
        event_id: EventId,
        external_user_id: ExternalUserId,
        full_name: String,
        phone: Option<String>,
        email: Option<String>,
        company: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&full_name)?;

        Ok(Self {
            id,
            event_id,
            external_user_id,
            full_name,
            phone,
            email,
            company,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute an attendee from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: AttendeeId,
        event_id: EventId,
        external_user_id: ExternalUserId,
        full_name: String,
        phone: Option<String>,
        email: Option<String>,
        company: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            external_user_id,
            full_name,
            phone,
            email,
            company,
            created_at,
        }
    }

    /// Returns the attendee ID.
    pub fn id(&self) -> &AttendeeId {
        &self.id
    }

    /// Returns the owning event ID.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Returns the external messaging identity.
    pub fn external_user_id(&self) -> ExternalUserId {
        self.external_user_id
    }

    /// Returns the display name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the contact phone.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the contact email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the company affiliation.
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Returns when the attendee registered.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(
                "full_name",
                "Full name cannot be empty",
            ));
        }
        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(
                "full_name",
                format!("Full name must be {} characters or less", MAX_NAME_LENGTH),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_attendee() -> Attendee {
        Attendee::new(
            AttendeeId::new(),
            EventId::new(),
            ExternalUserId::new(42),
            "Alice".to_string(),
            None,
            Some("alice@example.com".to_string()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn new_attendee_keeps_fields() {
        let attendee = test_attendee();
        assert_eq!(attendee.full_name(), "Alice");
        assert_eq!(attendee.external_user_id().as_i64(), 42);
        assert_eq!(attendee.email(), Some("alice@example.com"));
        assert_eq!(attendee.phone(), None);
    }

    #[test]
    fn new_attendee_rejects_empty_name() {
        let result = Attendee::new(
            AttendeeId::new(),
            EventId::new(),
            ExternalUserId::new(42),
            "   ".to_string(),
            None,
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_attendee_rejects_overlong_name() {
        let result = Attendee::new(
            AttendeeId::new(),
            EventId::new(),
            ExternalUserId::new(42),
            "x".repeat(MAX_NAME_LENGTH + 1),
            None,
            None,
            None,
        );
        assert!(result.is_err());
    }
}
