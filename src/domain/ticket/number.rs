//! Human-readable ticket numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

/// Maximum stored length of a ticket number.
pub const MAX_TICKET_NO_LENGTH: usize = 32;

/// Sequence-free ticket number shown to staff and attendees
/// (e.g. `T-9F3A21BC`).
///
/// Derived from a random UUID rather than a counter so numbers carry no
/// ordering information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNo(String);

impl TicketNo {
    /// Generates a fresh ticket number.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("T-{}", hex[..8].to_ascii_uppercase()))
    }

    /// Wraps an existing ticket number (reconstitution).
    pub fn new(number: impl Into<String>) -> Result<Self, ValidationError> {
        let number = number.into();
        if number.is_empty() {
            return Err(ValidationError::empty_field("ticket_no"));
        }
        if number.len() > MAX_TICKET_NO_LENGTH {
            return Err(ValidationError::too_long(
                "ticket_no",
                MAX_TICKET_NO_LENGTH,
                number.len(),
            ));
        }
        Ok(Self(number))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_number_has_expected_shape() {
        let no = TicketNo::generate();
        let s = no.as_str();
        assert_eq!(s.len(), 10);
        assert!(s.starts_with("T-"));
        assert!(s[2..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn generated_numbers_vary() {
        assert_ne!(TicketNo::generate(), TicketNo::generate());
    }

    #[test]
    fn new_rejects_empty_number() {
        assert!(TicketNo::new("").is_err());
    }

    #[test]
    fn new_accepts_existing_number() {
        let no = TicketNo::new("T-9F3A21BC").unwrap();
        assert_eq!(no.as_str(), "T-9F3A21BC");
    }
}
