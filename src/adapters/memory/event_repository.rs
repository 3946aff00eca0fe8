//! In-Memory Event Repository
//!
//! Stores events in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::ports::EventRepository;

/// In-memory implementation of `EventRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<EventId, Event>>>,
}

impl InMemoryEventRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of stored events.
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.write().await;
        let duplicate = events
            .values()
            .any(|e| e.code() == event.code() && e.id() != event.id());
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::DuplicateEventCode,
                format!("Event code already exists: {}", event.code()),
            ));
        }
        events.insert(*event.id(), event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Event>, DomainError> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .find(|e| e.code().as_str() == code)
            .cloned())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, DomainError> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .any(|e| e.code().as_str() == code))
    }
}
