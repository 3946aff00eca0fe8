//! PostgreSQL implementation of TicketRepository.
//!
//! The check-in write is a conditional UPDATE guarded by
//! `checked_in_at IS NULL`; the row lock serializes concurrent scanners
//! and the loser observes zero affected rows, never an overwrite.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, EventId, StaffId, TicketId, TicketStatus, Timestamp,
};
use crate::domain::ticket::{Ticket, TicketNo};
use crate::ports::{CheckInWrite, TicketRepository};

use super::get;

/// PostgreSQL implementation of TicketRepository.
#[derive(Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    /// Creates a new PostgresTicketRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, event_id, attendee_id, ticket_no, status,
                checked_in_at, checked_in_by, issued_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(ticket.id().as_uuid())
        .bind(ticket.event_id().as_uuid())
        .bind(ticket.attendee_id().as_uuid())
        .bind(ticket.ticket_no().as_str())
        .bind(ticket.status().as_str())
        .bind(ticket.checked_in_at().map(|t| *t.as_datetime()))
        .bind(ticket.checked_in_by().map(|s| s.as_str()))
        .bind(ticket.issued_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert ticket: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, attendee_id, ticket_no, status,
                   checked_in_at, checked_in_by, issued_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch ticket: {}", e),
            )
        })?;

        row.map(row_to_ticket).transpose()
    }

    async fn find_active_by_attendee(
        &self,
        attendee_id: &AttendeeId,
    ) -> Result<Option<Ticket>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, attendee_id, ticket_no, status,
                   checked_in_at, checked_in_by, issued_at
            FROM tickets
            WHERE attendee_id = $1 AND status = 'ACTIVE'
            ORDER BY issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(attendee_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch active ticket: {}", e),
            )
        })?;

        row.map(row_to_ticket).transpose()
    }

    async fn record_check_in(
        &self,
        id: &TicketId,
        at: &Timestamp,
        by: &StaffId,
    ) -> Result<CheckInWrite, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET checked_in_at = $2, checked_in_by = $3
            WHERE id = $1 AND checked_in_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .bind(by.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record check-in: {}", e),
            )
        })?;

        if result.rows_affected() > 0 {
            return Ok(CheckInWrite::Applied);
        }

        // No row matched: either the instant was already set, or the
        // ticket does not exist at all. Tickets are never deleted, so one
        // existence probe settles it.
        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check ticket existence: {}", e),
                )
            })?;

        if exists.0 == 0 {
            return Err(DomainError::new(
                ErrorCode::TicketNotFound,
                format!("Ticket not found: {}", id),
            ));
        }

        Ok(CheckInWrite::AlreadyCheckedIn)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn row_to_ticket(row: sqlx::postgres::PgRow) -> Result<Ticket, DomainError> {
    let id: uuid::Uuid = get(&row, "id")?;
    let event_id: uuid::Uuid = get(&row, "event_id")?;
    let attendee_id: uuid::Uuid = get(&row, "attendee_id")?;
    let ticket_no: String = get(&row, "ticket_no")?;
    let status_str: String = get(&row, "status")?;
    let checked_in_at: Option<chrono::DateTime<chrono::Utc>> = get(&row, "checked_in_at")?;
    let checked_in_by: Option<String> = get(&row, "checked_in_by")?;
    let issued_at: chrono::DateTime<chrono::Utc> = get(&row, "issued_at")?;

    let status = TicketStatus::parse(&status_str).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid ticket status: {}", status_str),
        )
    })?;

    let ticket_no = TicketNo::new(ticket_no).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid ticket number: {}", e),
        )
    })?;

    let checked_in_by = checked_in_by
        .map(StaffId::new)
        .transpose()
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid check-in operator: {}", e),
            )
        })?;

    Ok(Ticket::reconstitute(
        TicketId::from_uuid(id),
        EventId::from_uuid(event_id),
        AttendeeId::from_uuid(attendee_id),
        ticket_no,
        status,
        checked_in_at.map(Timestamp::from_datetime),
        checked_in_by,
        Timestamp::from_datetime(issued_at),
    ))
}
