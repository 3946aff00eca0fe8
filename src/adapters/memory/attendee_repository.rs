//! In-Memory Attendee Repository
//!
//! Enforces the (event, external user id) uniqueness guard under a single
//! write lock, so concurrent duplicate registrations race exactly as they
//! would against the database constraint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::attendee::Attendee;
use crate::domain::foundation::{AttendeeId, DomainError, EventId, ExternalUserId};
use crate::ports::{AttendeeInsert, AttendeeRepository};

/// In-memory implementation of `AttendeeRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttendeeRepository {
    attendees: Arc<RwLock<HashMap<AttendeeId, Attendee>>>,
}

impl InMemoryAttendeeRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            attendees: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of stored attendees.
    pub async fn count(&self) -> usize {
        self.attendees.read().await.len()
    }

    /// Count attendees registered for an event.
    pub async fn count_for_event(&self, event_id: &EventId) -> usize {
        self.attendees
            .read()
            .await
            .values()
            .filter(|a| a.event_id() == event_id)
            .count()
    }
}

#[async_trait]
impl AttendeeRepository for InMemoryAttendeeRepository {
    async fn insert(&self, attendee: &Attendee) -> Result<AttendeeInsert, DomainError> {
        let mut attendees = self.attendees.write().await;
        let duplicate = attendees.values().any(|a| {
            a.event_id() == attendee.event_id()
                && a.external_user_id() == attendee.external_user_id()
        });
        if duplicate {
            return Ok(AttendeeInsert::UniqueViolation);
        }
        attendees.insert(*attendee.id(), attendee.clone());
        Ok(AttendeeInsert::Inserted)
    }

    async fn find_by_id(&self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError> {
        Ok(self.attendees.read().await.get(id).cloned())
    }

    async fn find_by_event_and_external_id(
        &self,
        event_id: &EventId,
        external_user_id: ExternalUserId,
    ) -> Result<Option<Attendee>, DomainError> {
        Ok(self
            .attendees
            .read()
            .await
            .values()
            .find(|a| a.event_id() == event_id && a.external_user_id() == external_user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendee(event_id: EventId, external: i64, name: &str) -> Attendee {
        Attendee::new(
            AttendeeId::new(),
            event_id,
            ExternalUserId::new(external),
            name.to_string(),
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_find_by_identity() {
        let repo = InMemoryAttendeeRepository::new();
        let event_id = EventId::new();
        let alice = attendee(event_id, 42, "Alice");

        let outcome = repo.insert(&alice).await.unwrap();
        assert_eq!(outcome, AttendeeInsert::Inserted);

        let found = repo
            .find_by_event_and_external_id(&event_id, ExternalUserId::new(42))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.full_name(), "Alice");
    }

    #[tokio::test]
    async fn duplicate_identity_in_same_event_is_a_unique_violation() {
        let repo = InMemoryAttendeeRepository::new();
        let event_id = EventId::new();
        repo.insert(&attendee(event_id, 42, "Alice")).await.unwrap();

        let outcome = repo.insert(&attendee(event_id, 42, "Alice Again")).await.unwrap();
        assert_eq!(outcome, AttendeeInsert::UniqueViolation);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn same_identity_in_different_events_is_allowed() {
        let repo = InMemoryAttendeeRepository::new();
        repo.insert(&attendee(EventId::new(), 42, "Alice")).await.unwrap();

        let outcome = repo.insert(&attendee(EventId::new(), 42, "Alice")).await.unwrap();
        assert_eq!(outcome, AttendeeInsert::Inserted);
        assert_eq!(repo.count().await, 2);
    }
}
