//! PostgreSQL implementation of AttendeeRepository.
//!
//! The unique index on (event_id, external_user_id) is the authoritative
//! registration idempotency guard; a 23505 on insert is reported as
//! `AttendeeInsert::UniqueViolation` so the coordinator can fetch the
//! winner instead of crashing.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::attendee::Attendee;
use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, EventId, ExternalUserId, Timestamp,
};
use crate::ports::{AttendeeInsert, AttendeeRepository};

use super::{get, is_unique_violation};

/// PostgreSQL implementation of AttendeeRepository.
#[derive(Clone)]
pub struct PostgresAttendeeRepository {
    pool: PgPool,
}

impl PostgresAttendeeRepository {
    /// Creates a new PostgresAttendeeRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendeeRepository for PostgresAttendeeRepository {
    async fn insert(&self, attendee: &Attendee) -> Result<AttendeeInsert, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendees (
                id, event_id, external_user_id, full_name, phone, email, company, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(attendee.id().as_uuid())
        .bind(attendee.event_id().as_uuid())
        .bind(attendee.external_user_id().as_i64())
        .bind(attendee.full_name())
        .bind(attendee.phone())
        .bind(attendee.email())
        .bind(attendee.company())
        .bind(attendee.created_at().as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(AttendeeInsert::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(AttendeeInsert::UniqueViolation),
            Err(e) => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert attendee: {}", e),
            )),
        }
    }

    async fn find_by_id(&self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, external_user_id, full_name, phone, email, company, created_at
            FROM attendees
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch attendee: {}", e),
            )
        })?;

        row.map(row_to_attendee).transpose()
    }

    async fn find_by_event_and_external_id(
        &self,
        event_id: &EventId,
        external_user_id: ExternalUserId,
    ) -> Result<Option<Attendee>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, external_user_id, full_name, phone, email, company, created_at
            FROM attendees
            WHERE event_id = $1 AND external_user_id = $2
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(external_user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch attendee by identity: {}", e),
            )
        })?;

        row.map(row_to_attendee).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn row_to_attendee(row: sqlx::postgres::PgRow) -> Result<Attendee, DomainError> {
    let id: uuid::Uuid = get(&row, "id")?;
    let event_id: uuid::Uuid = get(&row, "event_id")?;
    let external_user_id: i64 = get(&row, "external_user_id")?;
    let full_name: String = get(&row, "full_name")?;
    let phone: Option<String> = get(&row, "phone")?;
    let email: Option<String> = get(&row, "email")?;
    let company: Option<String> = get(&row, "company")?;
    let created_at: chrono::DateTime<chrono::Utc> = get(&row, "created_at")?;

    Ok(Attendee::reconstitute(
        AttendeeId::from_uuid(id),
        EventId::from_uuid(event_id),
        ExternalUserId::new(external_user_id),
        full_name,
        phone,
        email,
        company,
        Timestamp::from_datetime(created_at),
    ))
}
