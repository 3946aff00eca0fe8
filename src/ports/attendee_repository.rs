//! Attendee repository port.
//!
//! The storage-level uniqueness constraint on (event, external user id) is
//! the authoritative guard behind registration idempotency, so `insert`
//! reports a unique violation as an ordinary outcome instead of an error:
//! the caller resolves the race by fetching the winner.

use crate::domain::attendee::Attendee;
use crate::domain::foundation::{AttendeeId, DomainError, EventId, ExternalUserId};
use async_trait::async_trait;

/// Outcome of an attendee insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendeeInsert {
    /// The row was inserted.
    Inserted,
    /// Another attendee already holds (event, external user id).
    UniqueViolation,
}

/// Repository port for Attendee aggregate persistence.
#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// Insert a new attendee.
    ///
    /// A (event, external user id) uniqueness conflict is reported as
    /// `AttendeeInsert::UniqueViolation`, not as an error.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, attendee: &Attendee) -> Result<AttendeeInsert, DomainError>;

    /// Find an attendee by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError>;

    /// Find the attendee registered for an event under an external
    /// identity.
    ///
    /// Returns `None` if not found.
    async fn find_by_event_and_external_id(
        &self,
        event_id: &EventId,
        external_user_id: ExternalUserId,
    ) -> Result<Option<Attendee>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn attendee_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AttendeeRepository) {}
    }
}
