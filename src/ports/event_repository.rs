//! Event repository port.
//!
//! Defines the contract for persisting and retrieving Event aggregates.
//! Implementations handle the actual database operations.

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, EventId};
use async_trait::async_trait;

/// Repository port for Event aggregate persistence.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Save a new event.
    ///
    /// # Errors
    ///
    /// - `DuplicateEventCode` if the code is already taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, event: &Event) -> Result<(), DomainError>;

    /// Find an event by its internal ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError>;

    /// Find an event by its human-facing code.
    ///
    /// Returns `None` if not found.
    async fn find_by_code(&self, code: &str) -> Result<Option<Event>, DomainError>;

    /// Check whether a code is already taken (used when generating codes).
    async fn exists_by_code(&self, code: &str) -> Result<bool, DomainError>;
}
