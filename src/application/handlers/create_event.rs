//! CreateEventHandler - Command handler for creating events.
//!
//! The human-facing code is generated here, once, and never mutated
//! afterwards; candidates are regenerated until one is free in the store.

use std::sync::Arc;

use crate::domain::event::{Event, EventCode};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, EventStatus, Timestamp};
use crate::ports::EventRepository;

/// Command to create a new event.
#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    /// Initial status; defaults to Draft when absent.
    pub status: Option<EventStatus>,
}

/// Event creation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateEventError {
    /// Invalid input (empty title, inverted window).
    ValidationFailed { field: String, message: String },
    /// Storage failure.
    Infrastructure(String),
}

impl std::fmt::Display for CreateEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateEventError::ValidationFailed { field, message } => {
                write!(f, "Validation failed for '{}': {}", field, message)
            }
            CreateEventError::Infrastructure(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CreateEventError {}

impl From<DomainError> for CreateEventError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => CreateEventError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => CreateEventError::Infrastructure(err.to_string()),
        }
    }
}

/// Handler for creating events.
pub struct CreateEventHandler {
    events: Arc<dyn EventRepository>,
}

impl CreateEventHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: CreateEventCommand) -> Result<Event, CreateEventError> {
        tracing::info!(title = %cmd.title, "Creating event");

        let code = self.generate_unique_code().await?;

        let event = Event::new(
            EventId::new(),
            code,
            cmd.title,
            cmd.description,
            cmd.location,
            cmd.start_at,
            cmd.end_at,
            cmd.status.unwrap_or(EventStatus::Draft),
        )?;

        self.events.save(&event).await?;

        tracing::info!(code = %event.code(), id = %event.id(), "Event created");
        Ok(event)
    }

    async fn generate_unique_code(&self) -> Result<EventCode, CreateEventError> {
        loop {
            let candidate = EventCode::generate();
            if !self.events.exists_by_code(candidate.as_str()).await? {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEventRepository;

    fn window() -> (Timestamp, Timestamp) {
        let start = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        (start, start.plus_hours(2))
    }

    fn cmd() -> CreateEventCommand {
        let (start_at, end_at) = window();
        CreateEventCommand {
            title: "Launch Party".to_string(),
            description: None,
            location: Some("Main Hall".to_string()),
            start_at,
            end_at,
            status: None,
        }
    }

    #[tokio::test]
    async fn creates_draft_event_with_generated_code() {
        let repo = Arc::new(InMemoryEventRepository::new());
        let handler = CreateEventHandler::new(repo.clone());

        let event = handler.handle(cmd()).await.unwrap();

        assert_eq!(event.status(), EventStatus::Draft);
        assert!(event.code().as_str().starts_with("EVT"));
        assert!(repo.exists_by_code(event.code().as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn honors_requested_status() {
        let repo = Arc::new(InMemoryEventRepository::new());
        let handler = CreateEventHandler::new(repo);

        let mut cmd = cmd();
        cmd.status = Some(EventStatus::Published);
        let event = handler.handle(cmd).await.unwrap();
        assert_eq!(event.status(), EventStatus::Published);
    }

    #[tokio::test]
    async fn rejects_inverted_window() {
        let repo = Arc::new(InMemoryEventRepository::new());
        let handler = CreateEventHandler::new(repo.clone());

        let (start_at, end_at) = window();
        let mut cmd = cmd();
        cmd.start_at = end_at;
        cmd.end_at = start_at;

        let result = handler.handle(cmd).await;
        assert!(matches!(
            result,
            Err(CreateEventError::ValidationFailed { .. })
        ));
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn generated_codes_are_unique_across_events() {
        let repo = Arc::new(InMemoryEventRepository::new());
        let handler = CreateEventHandler::new(repo.clone());

        let a = handler.handle(cmd()).await.unwrap();
        let b = handler.handle(cmd()).await.unwrap();
        assert_ne!(a.code(), b.code());
        assert_eq!(repo.count().await, 2);
    }
}
