//! FindEventHandler - Resolves an event by human code or opaque id.
//!
//! External callers hold either the human-facing code (`EVT...`) or the
//! opaque form of the internal id. Opaque decoding is tried first; a string
//! that does not decode under the configured salt falls back to a code
//! lookup, so the two namespaces cannot shadow each other accidentally.

use std::sync::Arc;

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::domain::opaque::OpaqueIdCodec;
use crate::ports::EventRepository;

/// A resolved event together with its external opaque handle.
#[derive(Debug, Clone)]
pub struct FoundEvent {
    pub event: Event,
    /// Opaque form of the event id, safe to expose externally.
    pub opaque_id: Option<String>,
}

/// Event lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindEventError {
    /// Nothing matched the given code or opaque id.
    NotFound(String),
    /// Storage failure.
    Infrastructure(String),
}

impl std::fmt::Display for FindEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindEventError::NotFound(key) => write!(f, "Event not found: {}", key),
            FindEventError::Infrastructure(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for FindEventError {}

impl From<DomainError> for FindEventError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EventNotFound => FindEventError::NotFound(err.message),
            _ => FindEventError::Infrastructure(err.to_string()),
        }
    }
}

/// Handler for event lookups.
pub struct FindEventHandler {
    events: Arc<dyn EventRepository>,
    codec: Arc<OpaqueIdCodec>,
}

impl FindEventHandler {
    pub fn new(events: Arc<dyn EventRepository>, codec: Arc<OpaqueIdCodec>) -> Self {
        Self { events, codec }
    }

    pub async fn handle(&self, code_or_opaque: &str) -> Result<FoundEvent, FindEventError> {
        let key = code_or_opaque.trim();
        if key.is_empty() {
            return Err(FindEventError::NotFound(key.to_string()));
        }

        if let Some(uuid) = self.codec.decode_uuid(key) {
            let id = EventId::from_uuid(uuid);
            if let Some(event) = self.events.find_by_id(&id).await? {
                return Ok(self.found(event));
            }
        }

        match self.events.find_by_code(key).await? {
            Some(event) => Ok(self.found(event)),
            None => Err(FindEventError::NotFound(key.to_string())),
        }
    }

    fn found(&self, event: Event) -> FoundEvent {
        let opaque_id = self.codec.encode_uuid(event.id().as_uuid());
        FoundEvent { event, opaque_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEventRepository;
    use crate::domain::event::EventCode;
    use crate::domain::foundation::{EventStatus, Timestamp};

    fn codec() -> Arc<OpaqueIdCodec> {
        Arc::new(OpaqueIdCodec::new("this is my salt", 6))
    }

    async fn setup() -> (Arc<InMemoryEventRepository>, Event) {
        let repo = Arc::new(InMemoryEventRepository::new());
        let start = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let event = Event::new(
            EventId::new(),
            EventCode::new("EVT1234567").unwrap(),
            "Launch Party".to_string(),
            None,
            None,
            start,
            start.plus_hours(2),
            EventStatus::Published,
        )
        .unwrap();
        repo.save(&event).await.unwrap();
        (repo, event)
    }

    #[tokio::test]
    async fn resolves_by_human_code() {
        let (repo, event) = setup().await;
        let handler = FindEventHandler::new(repo, codec());

        let found = handler.handle("EVT1234567").await.unwrap();
        assert_eq!(found.event.id(), event.id());
        assert!(found.opaque_id.is_some());
    }

    #[tokio::test]
    async fn resolves_by_opaque_id() {
        let (repo, event) = setup().await;
        let codec = codec();
        let handler = FindEventHandler::new(repo, codec.clone());

        let opaque = codec.encode_uuid(event.id().as_uuid()).unwrap();
        let found = handler.handle(&opaque).await.unwrap();
        assert_eq!(found.event.id(), event.id());
        assert_eq!(found.opaque_id.as_deref(), Some(opaque.as_str()));
    }

    #[tokio::test]
    async fn opaque_id_from_foreign_salt_does_not_resolve() {
        let (repo, event) = setup().await;
        let handler = FindEventHandler::new(repo, codec());

        let foreign = OpaqueIdCodec::new("other salt", 6)
            .encode_uuid(event.id().as_uuid())
            .unwrap();
        let result = handler.handle(&foreign).await;
        assert!(matches!(result, Err(FindEventError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let (repo, _) = setup().await;
        let handler = FindEventHandler::new(repo, codec());

        let result = handler.handle("EVT0000000").await;
        assert!(matches!(result, Err(FindEventError::NotFound(_))));
    }

    #[tokio::test]
    async fn blank_key_is_not_found() {
        let (repo, _) = setup().await;
        let handler = FindEventHandler::new(repo, codec());

        let result = handler.handle("  ").await;
        assert!(matches!(result, Err(FindEventError::NotFound(_))));
    }
}
