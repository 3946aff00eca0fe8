//! CheckInTicketHandler - Verifies a scanned token and consumes the ticket.
//!
//! Every business rejection (unknown event, revoked ticket, duplicate scan,
//! outside the window, malformed payload) is an ordinary `CheckInOutcome`
//! with `success == false`, so the gate endpoint can always answer the
//! scanning client normally. The one intentional exception is a forged
//! signature: that is a security violation and surfaces as a distinct hard
//! error so it can be separated in logs and metrics from routine
//! rejections.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, StaffId, TicketId, TicketStatus, Timestamp};
use crate::domain::token::{ParsedToken, TicketSigner};
use crate::ports::{AttendeeRepository, CheckInWrite, EventRepository, TicketRepository};

/// Command to check in a scanned ticket token.
#[derive(Debug, Clone)]
pub struct CheckInTicketCommand {
    /// The scanned payload, bare or as a full URL.
    pub payload: String,
    /// Who is performing the check-in.
    pub staff: StaffId,
}

/// Structured answer for the scanning client.
///
/// Rejections carry best-effort context (attendee name, ticket number,
/// prior check-in instant) to aid the staff operator; they never expose
/// internal identifiers or the signing secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    /// Whether the ticket was consumed by this call.
    pub success: bool,
    /// Human-readable reason shown to the operator.
    pub reason: String,
    /// Attendee display name, when known and safe to share.
    pub attendee_name: Option<String>,
    /// Ticket number, when the ticket was resolved.
    pub ticket_no: Option<String>,
    /// The effective check-in instant: new on success, original on a
    /// duplicate scan.
    pub checked_in_at: Option<Timestamp>,
}

impl CheckInOutcome {
    fn accepted(attendee_name: Option<String>, ticket_no: String, at: Timestamp) -> Self {
        Self {
            success: true,
            reason: "Checked in".to_string(),
            attendee_name,
            ticket_no: Some(ticket_no),
            checked_in_at: Some(at),
        }
    }

    fn rejected(reason: &str) -> Self {
        Self {
            success: false,
            reason: reason.to_string(),
            attendee_name: None,
            ticket_no: None,
            checked_in_at: None,
        }
    }

    fn with_ticket_no(mut self, ticket_no: String) -> Self {
        self.ticket_no = Some(ticket_no);
        self
    }

    fn with_attendee_name(mut self, name: Option<String>) -> Self {
        self.attendee_name = name;
        self
    }

    fn with_checked_in_at(mut self, at: Timestamp) -> Self {
        self.checked_in_at = Some(at);
        self
    }
}

/// Errors that abort a check-in instead of answering the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    /// Signature mismatch: the payload was forged or tampered with.
    InvalidSignature,
    /// Storage failure.
    Infrastructure(String),
}

impl CheckInError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckInError::InvalidSignature => ErrorCode::InvalidToken,
            CheckInError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl std::fmt::Display for CheckInError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckInError::InvalidSignature => write!(f, "Invalid signature (fake QR)"),
            CheckInError::Infrastructure(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CheckInError {}

impl From<crate::domain::foundation::DomainError> for CheckInError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        CheckInError::Infrastructure(err.to_string())
    }
}

/// Handler for the gate check-in operation.
pub struct CheckInTicketHandler {
    events: Arc<dyn EventRepository>,
    attendees: Arc<dyn AttendeeRepository>,
    tickets: Arc<dyn TicketRepository>,
    signer: TicketSigner,
}

impl CheckInTicketHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        attendees: Arc<dyn AttendeeRepository>,
        tickets: Arc<dyn TicketRepository>,
        signer: TicketSigner,
    ) -> Self {
        Self {
            events,
            attendees,
            tickets,
            signer,
        }
    }

    /// Check in with the current wall clock.
    pub async fn handle(&self, cmd: CheckInTicketCommand) -> Result<CheckInOutcome, CheckInError> {
        self.handle_at(cmd, Timestamp::now()).await
    }

    /// Check in evaluating the window rule against an explicit instant.
    pub async fn handle_at(
        &self,
        cmd: CheckInTicketCommand,
        now: Timestamp,
    ) -> Result<CheckInOutcome, CheckInError> {
        tracing::info!(staff = %cmd.staff, "Check-in attempt");

        // 1. The payload must carry all four required fields.
        let Some(token) = ParsedToken::parse(&cmd.payload) else {
            tracing::warn!("Invalid QR payload: missing required parameters");
            return Ok(CheckInOutcome::rejected("Invalid QR payload"));
        };

        // 2. Recompute the signature before touching any state.
        if !token.verify(&self.signer) {
            tracing::warn!(
                event_code = token.payload.event_code(),
                "Invalid QR signature"
            );
            return Err(CheckInError::InvalidSignature);
        }

        // 3. The event named by the payload must exist.
        let Some(event) = self.events.find_by_code(token.payload.event_code()).await? else {
            tracing::warn!(event_code = token.payload.event_code(), "Event not found");
            return Ok(CheckInOutcome::rejected("Event not found"));
        };

        // 4. The ticket id must parse as an identifier.
        let Ok(ticket_id) = TicketId::from_str(token.payload.ticket_id()) else {
            tracing::warn!("Invalid ticket id format");
            return Ok(CheckInOutcome::rejected("Invalid ticket id"));
        };

        // 5. The ticket must exist.
        let Some(ticket) = self.tickets.find_by_id(&ticket_id).await? else {
            tracing::warn!(ticket_id = %ticket_id, "Ticket not found");
            return Ok(CheckInOutcome::rejected("Ticket not found"));
        };

        // 6. The ticket must belong to the event the payload names.
        if !ticket.belongs_to(event.id()) {
            tracing::warn!(
                ticket_no = %ticket.ticket_no(),
                event_code = %event.code(),
                "Cross-event ticket"
            );
            return Ok(CheckInOutcome::rejected(
                "Ticket does not belong to this event",
            ));
        }

        // 7. Revoked tickets surface the ticket number but no attendee data.
        if ticket.status() == TicketStatus::Revoked {
            tracing::warn!(ticket_no = %ticket.ticket_no(), "Revoked ticket at the gate");
            return Ok(CheckInOutcome::rejected("Ticket revoked")
                .with_ticket_no(ticket.ticket_no().to_string()));
        }

        let attendee_name = self
            .attendees
            .find_by_id(ticket.attendee_id())
            .await?
            .map(|a| a.full_name().to_string());

        // 8. Duplicate scans are answered idempotently with the original
        //    instant; nothing changes.
        if let Some(original) = ticket.checked_in_at() {
            tracing::warn!(ticket_no = %ticket.ticket_no(), "Duplicate check-in attempt");
            return Ok(CheckInOutcome::rejected("Already checked-in")
                .with_attendee_name(attendee_name)
                .with_ticket_no(ticket.ticket_no().to_string())
                .with_checked_in_at(*original));
        }

        // 9. The check-in window is inclusive on both bounds.
        if !event.is_within_window(&now) {
            tracing::warn!(event_code = %event.code(), "Check-in outside event time window");
            return Ok(CheckInOutcome::rejected(
                "Event not active (outside time window)",
            )
            .with_attendee_name(attendee_name)
            .with_ticket_no(ticket.ticket_no().to_string()));
        }

        // 10. Consume the ticket. The conditional write serializes
        //     concurrent scans; losers observe the duplicate outcome with
        //     the winner's instant.
        match self
            .tickets
            .record_check_in(&ticket_id, &now, &cmd.staff)
            .await?
        {
            CheckInWrite::Applied => {
                tracing::info!(
                    ticket_no = %ticket.ticket_no(),
                    staff = %cmd.staff,
                    "Check-in successful"
                );
                Ok(CheckInOutcome::accepted(
                    attendee_name,
                    ticket.ticket_no().to_string(),
                    now,
                ))
            }
            CheckInWrite::AlreadyCheckedIn => {
                let original = self
                    .tickets
                    .find_by_id(&ticket_id)
                    .await?
                    .and_then(|t| t.checked_in_at().copied());
                tracing::warn!(
                    ticket_no = %ticket.ticket_no(),
                    "Lost check-in race; ticket already consumed"
                );
                let mut outcome = CheckInOutcome::rejected("Already checked-in")
                    .with_attendee_name(attendee_name)
                    .with_ticket_no(ticket.ticket_no().to_string());
                if let Some(at) = original {
                    outcome = outcome.with_checked_in_at(at);
                }
                Ok(outcome)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAttendeeRepository, InMemoryEventRepository, InMemoryTicketRepository,
    };
    use crate::domain::attendee::Attendee;
    use crate::domain::event::{Event, EventCode};
    use crate::domain::foundation::{
        AttendeeId, DomainError, EventId, EventStatus, ExternalUserId,
    };
    use crate::domain::ticket::{Ticket, TicketNo};
    use crate::domain::token::TokenPayload;
    use async_trait::async_trait;

    const SECRET: &str = "test-secret";

    struct Fixture {
        events: Arc<InMemoryEventRepository>,
        attendees: Arc<InMemoryAttendeeRepository>,
        tickets: Arc<InMemoryTicketRepository>,
        handler: CheckInTicketHandler,
        event: Event,
        ticket: Ticket,
        payload: String,
    }

    async fn fixture() -> Fixture {
        let events = Arc::new(InMemoryEventRepository::new());
        let attendees = Arc::new(InMemoryAttendeeRepository::new());
        let tickets = Arc::new(InMemoryTicketRepository::new());

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
        events.save(&event).await.unwrap();

        let attendee = Attendee::new(
            AttendeeId::new(),
            *event.id(),
            ExternalUserId::new(42),
            "Alice".to_string(),
            None,
            None,
            None,
        )
        .unwrap();
        attendees.insert(&attendee).await.unwrap();

        let ticket = Ticket::issue(
            TicketId::new(),
            *event.id(),
            *attendee.id(),
            TicketNo::generate(),
            start,
        );
        tickets.insert(&ticket).await.unwrap();

        let signer = TicketSigner::new(SECRET);
        let payload = TokenPayload::new(
            ticket.id().to_string(),
            event.code().as_str(),
            ticket.issued_at().as_unix_secs(),
        )
        .into_signed(&signer);

        let handler = CheckInTicketHandler::new(
            events.clone(),
            attendees.clone(),
            tickets.clone(),
            signer,
        );

        Fixture {
            events,
            attendees,
            tickets,
            handler,
            event,
            ticket,
            payload,
        }
    }

    fn cmd(payload: &str) -> CheckInTicketCommand {
        CheckInTicketCommand {
            payload: payload.to_string(),
            staff: StaffId::new("gate-1").unwrap(),
        }
    }

    fn in_window() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_600).unwrap()
    }

    #[tokio::test]
    async fn valid_scan_checks_in() {
        let f = fixture().await;
        let outcome = f.handler.handle_at(cmd(&f.payload), in_window()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.attendee_name.as_deref(), Some("Alice"));
        assert_eq!(outcome.ticket_no.as_deref(), Some(f.ticket.ticket_no().as_str()));
        assert_eq!(outcome.checked_in_at, Some(in_window()));

        let stored = f.tickets.find_by_id(f.ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.checked_in_by().unwrap().as_str(), "gate-1");
    }

    #[tokio::test]
    async fn scan_accepts_full_url() {
        let f = fixture().await;
        let url = format!("https://gate.example.com/scan?{}", f.payload);
        let outcome = f.handler.handle_at(cmd(&url), in_window()).await.unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected_without_error() {
        let f = fixture().await;
        let outcome = f
            .handler
            .handle_at(cmd("t=abc&e=EVT1234567"), in_window())
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Invalid QR payload");
    }

    #[tokio::test]
    async fn forged_signature_is_a_hard_error() {
        let f = fixture().await;
        let mut tampered = f.payload.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });

        let result = f.handler.handle_at(cmd(&tampered), in_window()).await;
        assert_eq!(result, Err(CheckInError::InvalidSignature));

        // No state change.
        let stored = f.tickets.find_by_id(f.ticket.id()).await.unwrap().unwrap();
        assert!(!stored.is_checked_in());
    }

    #[tokio::test]
    async fn unknown_event_is_rejected() {
        let f = fixture().await;
        let signer = TicketSigner::new(SECRET);
        let payload = TokenPayload::new(
            f.ticket.id().to_string(),
            "EVT0000000",
            f.ticket.issued_at().as_unix_secs(),
        )
        .into_signed(&signer);

        let outcome = f.handler.handle_at(cmd(&payload), in_window()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Event not found");
    }

    #[tokio::test]
    async fn malformed_ticket_id_is_rejected() {
        let f = fixture().await;
        let signer = TicketSigner::new(SECRET);
        let payload = TokenPayload::new("not-a-uuid", "EVT1234567", 1_700_000_000)
            .into_signed(&signer);

        let outcome = f.handler.handle_at(cmd(&payload), in_window()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Invalid ticket id");
    }

    #[tokio::test]
    async fn unknown_ticket_is_rejected() {
        let f = fixture().await;
        let signer = TicketSigner::new(SECRET);
        let payload = TokenPayload::new(
            TicketId::new().to_string(),
            "EVT1234567",
            1_700_000_000,
        )
        .into_signed(&signer);

        let outcome = f.handler.handle_at(cmd(&payload), in_window()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Ticket not found");
    }

    #[tokio::test]
    async fn cross_event_ticket_is_rejected() {
        let f = fixture().await;

        // A second event whose code the payload will (legitimately) name.
        let start = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let other = Event::new(
            EventId::new(),
            EventCode::new("EVT7654321").unwrap(),
            "Other Event".to_string(),
            None,
            None,
            start,
            start.plus_hours(2),
            EventStatus::Published,
        )
        .unwrap();
        f.events.save(&other).await.unwrap();

        let signer = TicketSigner::new(SECRET);
        let payload = TokenPayload::new(
            f.ticket.id().to_string(),
            "EVT7654321",
            f.ticket.issued_at().as_unix_secs(),
        )
        .into_signed(&signer);

        let outcome = f.handler.handle_at(cmd(&payload), in_window()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Ticket does not belong to this event");
    }

    #[tokio::test]
    async fn revoked_ticket_surfaces_number_but_no_attendee() {
        let f = fixture().await;
        let mut revoked = f.ticket.clone();
        revoked.revoke().unwrap();
        f.tickets.put(revoked).await;

        let outcome = f.handler.handle_at(cmd(&f.payload), in_window()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Ticket revoked");
        assert_eq!(outcome.ticket_no.as_deref(), Some(f.ticket.ticket_no().as_str()));
        assert!(outcome.attendee_name.is_none());
        assert!(outcome.checked_in_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_scan_returns_original_instant() {
        let f = fixture().await;
        let first = f.handler.handle_at(cmd(&f.payload), in_window()).await.unwrap();
        assert!(first.success);

        let later = in_window().plus_secs(300);
        let second = f.handler.handle_at(cmd(&f.payload), later).await.unwrap();

        assert!(!second.success);
        assert_eq!(second.reason, "Already checked-in");
        assert_eq!(second.attendee_name.as_deref(), Some("Alice"));
        assert_eq!(second.checked_in_at, Some(in_window()));

        // The stored instant was not mutated by the second scan.
        let stored = f.tickets.find_by_id(f.ticket.id()).await.unwrap().unwrap();
        assert_eq!(stored.checked_in_at(), Some(&in_window()));
    }

    #[tokio::test]
    async fn window_bounds_are_inclusive() {
        let f = fixture().await;

        let at_start = f
            .handler
            .handle_at(cmd(&f.payload), *f.event.start_at())
            .await
            .unwrap();
        assert!(at_start.success);

        // Fresh fixture for the end-bound case; the first scan consumed it.
        let f = fixture().await;
        let at_end = f
            .handler
            .handle_at(cmd(&f.payload), *f.event.end_at())
            .await
            .unwrap();
        assert!(at_end.success);
    }

    #[tokio::test]
    async fn scans_outside_window_are_rejected() {
        let f = fixture().await;

        let before = f.event.start_at().plus_secs(-1);
        let outcome = f.handler.handle_at(cmd(&f.payload), before).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "Event not active (outside time window)");
        assert_eq!(outcome.attendee_name.as_deref(), Some("Alice"));

        let after = f.event.end_at().plus_secs(1);
        let outcome = f.handler.handle_at(cmd(&f.payload), after).await.unwrap();
        assert!(!outcome.success);

        let stored = f.tickets.find_by_id(f.ticket.id()).await.unwrap().unwrap();
        assert!(!stored.is_checked_in());
    }

    #[tokio::test]
    async fn concurrent_scans_have_exactly_one_winner() {
        let f = fixture().await;
        let handler = Arc::new(f.handler);

        let mut handles = Vec::new();
        for i in 0..8 {
            let handler = handler.clone();
            let payload = f.payload.clone();
            handles.push(tokio::spawn(async move {
                let cmd = CheckInTicketCommand {
                    payload,
                    staff: StaffId::new(format!("gate-{}", i)).unwrap(),
                };
                handler.handle_at(cmd, in_window()).await.unwrap()
            }));
        }

        let mut winners = 0;
        let mut duplicates = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            if outcome.success {
                winners += 1;
            } else {
                assert_eq!(outcome.reason, "Already checked-in");
                duplicates += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(duplicates, 7);

        // The stored operator matches the single winner.
        let stored = f.tickets.find_by_id(f.ticket.id()).await.unwrap().unwrap();
        assert!(stored.is_checked_in());
        assert!(stored.checked_in_by().unwrap().as_str().starts_with("gate-"));
    }

    #[tokio::test]
    async fn storage_failure_is_infrastructure_error() {
        struct FailingTickets;

        #[async_trait]
        impl TicketRepository for FailingTickets {
            async fn insert(&self, _ticket: &Ticket) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "down"))
            }
            async fn find_by_id(&self, _id: &TicketId) -> Result<Option<Ticket>, DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "down"))
            }
            async fn find_active_by_attendee(
                &self,
                _attendee_id: &AttendeeId,
            ) -> Result<Option<Ticket>, DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "down"))
            }
            async fn record_check_in(
                &self,
                _id: &TicketId,
                _at: &Timestamp,
                _by: &StaffId,
            ) -> Result<CheckInWrite, DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "down"))
            }
        }

        let f = fixture().await;
        let handler = CheckInTicketHandler::new(
            f.events.clone(),
            f.attendees.clone(),
            Arc::new(FailingTickets),
            TicketSigner::new(SECRET),
        );

        let result = handler.handle_at(cmd(&f.payload), in_window()).await;
        assert!(matches!(result, Err(CheckInError::Infrastructure(_))));
    }
}
