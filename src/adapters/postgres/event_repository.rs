//! PostgreSQL implementation of EventRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::event::{Event, EventCode};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, EventStatus, Timestamp};
use crate::ports::EventRepository;

use super::{get, is_unique_violation};

/// PostgreSQL implementation of EventRepository.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Creates a new PostgresEventRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, code, title, description, location, start_at, end_at, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                status = EXCLUDED.status
            "#,
        )
        .bind(event.id().as_uuid())
        .bind(event.code().as_str())
        .bind(event.title())
        .bind(event.description())
        .bind(event.location())
        .bind(event.start_at().as_datetime())
        .bind(event.end_at().as_datetime())
        .bind(event.status().as_str())
        .bind(event.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::DuplicateEventCode,
                    format!("Event code already exists: {}", event.code()),
                )
            } else {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert event: {}", e),
                )
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, title, description, location, start_at, end_at, status, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch event: {}", e),
            )
        })?;

        row.map(row_to_event).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Event>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, title, description, location, start_at, end_at, status, created_at
            FROM events
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch event by code: {}", e),
            )
        })?;

        row.map(row_to_event).transpose()
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE code = $1")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check event code: {}", e),
                )
            })?;

        Ok(result.0 > 0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn row_to_event(row: sqlx::postgres::PgRow) -> Result<Event, DomainError> {
    let id: uuid::Uuid = get(&row, "id")?;
    let code: String = get(&row, "code")?;
    let title: String = get(&row, "title")?;
    let description: Option<String> = get(&row, "description")?;
    let location: Option<String> = get(&row, "location")?;
    let start_at: chrono::DateTime<chrono::Utc> = get(&row, "start_at")?;
    let end_at: chrono::DateTime<chrono::Utc> = get(&row, "end_at")?;
    let status_str: String = get(&row, "status")?;
    let created_at: chrono::DateTime<chrono::Utc> = get(&row, "created_at")?;

    let status = EventStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid event status: {}", status_str),
        )
    })?;

    let code = EventCode::new(code)
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid code: {}", e)))?;

    Ok(Event::reconstitute(
        EventId::from_uuid(id),
        code,
        title,
        description,
        location,
        Timestamp::from_datetime(start_at),
        Timestamp::from_datetime(end_at),
        status,
        Timestamp::from_datetime(created_at),
    ))
}
