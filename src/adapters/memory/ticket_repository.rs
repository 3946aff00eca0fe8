//! In-Memory Ticket Repository
//!
//! The check-in write holds the map's write lock across the
//! check-then-set, giving the same winner/loser serialization the
//! conditional UPDATE provides against PostgreSQL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, StaffId, TicketId, TicketStatus, Timestamp,
};
use crate::domain::ticket::Ticket;
use crate::ports::{CheckInWrite, TicketRepository};

/// In-memory implementation of `TicketRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketRepository {
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl InMemoryTicketRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of stored tickets.
    pub async fn count(&self) -> usize {
        self.tickets.read().await.len()
    }

    /// Replace a stored ticket wholesale (test setup, e.g. revocation).
    pub async fn put(&self, ticket: Ticket) {
        self.tickets.write().await.insert(*ticket.id(), ticket);
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), DomainError> {
        self.tickets
            .write()
            .await
            .insert(*ticket.id(), ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError> {
        Ok(self.tickets.read().await.get(id).cloned())
    }

    async fn find_active_by_attendee(
        &self,
        attendee_id: &AttendeeId,
    ) -> Result<Option<Ticket>, DomainError> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .find(|t| t.attendee_id() == attendee_id && t.status() == TicketStatus::Active)
            .cloned())
    }

    async fn record_check_in(
        &self,
        id: &TicketId,
        at: &Timestamp,
        by: &StaffId,
    ) -> Result<CheckInWrite, DomainError> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::TicketNotFound, format!("Ticket not found: {}", id))
        })?;

        if ticket.is_checked_in() {
            return Ok(CheckInWrite::AlreadyCheckedIn);
        }

        ticket
            .check_in(*at, by.clone())
            .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;
        Ok(CheckInWrite::Applied)
    }
}
