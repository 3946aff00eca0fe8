//! RegisterAttendeeHandler - Idempotent attendee registration and ticket
//! issuance.
//!
//! The attendee row is idempotent on (event, external identity): a lost
//! insert race is resolved by fetching the winner, never by surfacing the
//! uniqueness violation. Ticket issuance is NOT idempotent by default: a
//! retried registration call issues a fresh ticket for the same attendee,
//! so a network retry can over-issue (see DESIGN.md). The stricter mode
//! behind `idempotent_tickets` reuses the attendee's existing active
//! ticket instead.

use std::sync::Arc;

use crate::domain::attendee::Attendee;
use crate::domain::event::Event;
use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, ExternalUserId, TicketId, Timestamp,
};
use crate::domain::ticket::{Ticket, TicketNo};
use crate::domain::token::{TicketSigner, TokenPayload};
use crate::ports::{
    AttendeeInsert, AttendeeRepository, EventRepository, Notifier, TicketRepository,
};

/// Command to register an attendee for an event.
#[derive(Debug, Clone)]
pub struct RegisterAttendeeCommand {
    pub event_code: String,
    pub external_user_id: ExternalUserId,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket_id: TicketId,
    pub ticket_no: String,
    pub event_code: String,
    /// The signed scannable token for the gate.
    pub qr_payload: String,
    pub issued_at: Timestamp,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// No event carries the given code.
    EventNotFound(String),
    /// The event is closed; registration refused.
    EventClosed,
    /// Invalid input.
    ValidationFailed { field: String, message: String },
    /// Storage failure.
    Infrastructure(String),
}

impl RegistrationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistrationError::EventNotFound(_) => ErrorCode::EventNotFound,
            RegistrationError::EventClosed => ErrorCode::EventClosed,
            RegistrationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            RegistrationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::EventNotFound(code) => write!(f, "Event not found: {}", code),
            RegistrationError::EventClosed => write!(f, "Event is closed"),
            RegistrationError::ValidationFailed { field, message } => {
                write!(f, "Validation failed for '{}': {}", field, message)
            }
            RegistrationError::Infrastructure(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for RegistrationError {}

impl From<DomainError> for RegistrationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => RegistrationError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => RegistrationError::Infrastructure(err.to_string()),
        }
    }
}

/// Handler for attendee registration.
pub struct RegisterAttendeeHandler {
    events: Arc<dyn EventRepository>,
    attendees: Arc<dyn AttendeeRepository>,
    tickets: Arc<dyn TicketRepository>,
    notifier: Arc<dyn Notifier>,
    signer: TicketSigner,
    /// Reuse an existing active ticket on retried registrations instead of
    /// issuing a new one.
    idempotent_tickets: bool,
}

impl RegisterAttendeeHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        attendees: Arc<dyn AttendeeRepository>,
        tickets: Arc<dyn TicketRepository>,
        notifier: Arc<dyn Notifier>,
        signer: TicketSigner,
    ) -> Self {
        Self {
            events,
            attendees,
            tickets,
            notifier,
            signer,
            idempotent_tickets: false,
        }
    }

    /// Enable or disable idempotent ticket issuance.
    pub fn with_idempotent_tickets(mut self, enabled: bool) -> Self {
        self.idempotent_tickets = enabled;
        self
    }

    pub async fn handle(
        &self,
        cmd: RegisterAttendeeCommand,
    ) -> Result<IssuedTicket, RegistrationError> {
        tracing::info!(
            event_code = %cmd.event_code,
            external_user_id = %cmd.external_user_id,
            "Registering attendee"
        );

        // 1-2. The event must exist and accept registrations.
        let event = self
            .events
            .find_by_code(&cmd.event_code)
            .await?
            .ok_or_else(|| RegistrationError::EventNotFound(cmd.event_code.clone()))?;

        if !event.is_open_for_registration() {
            tracing::warn!(event_code = %event.code(), "Registration refused: event closed");
            return Err(RegistrationError::EventClosed);
        }

        // 3. Find-or-create the attendee; the unique constraint arbitrates
        //    concurrent duplicates.
        let attendee = self.find_or_create_attendee(&event, &cmd).await?;

        // 4. Issue the ticket (or reuse, in the stricter mode).
        let ticket = self.issue_ticket(&attendee, &event).await?;

        // 5. Build the signed scannable payload.
        let qr_payload = TokenPayload::new(
            ticket.id().to_string(),
            event.code().as_str(),
            ticket.issued_at().as_unix_secs(),
        )
        .into_signed(&self.signer);

        // 6. Best-effort confirmation, detached from the critical path.
        self.spawn_confirmation(&cmd, &ticket, &event);

        tracing::info!(
            ticket_no = %ticket.ticket_no(),
            event_code = %event.code(),
            "Ticket issued"
        );

        Ok(IssuedTicket {
            ticket_id: *ticket.id(),
            ticket_no: ticket.ticket_no().to_string(),
            event_code: event.code().to_string(),
            qr_payload,
            issued_at: *ticket.issued_at(),
        })
    }

    async fn find_or_create_attendee(
        &self,
        event: &Event,
        cmd: &RegisterAttendeeCommand,
    ) -> Result<Attendee, RegistrationError> {
        if let Some(existing) = self
            .attendees
            .find_by_event_and_external_id(event.id(), cmd.external_user_id)
            .await?
        {
            return Ok(existing);
        }

        let candidate = Attendee::new(
            AttendeeId::new(),
            *event.id(),
            cmd.external_user_id,
            cmd.full_name.clone(),
            cmd.phone.clone(),
            cmd.email.clone(),
            cmd.company.clone(),
        )?;

        match self.attendees.insert(&candidate).await? {
            AttendeeInsert::Inserted => Ok(candidate),
            AttendeeInsert::UniqueViolation => {
                // A concurrent registration won the insert; fetch the winner
                // and proceed with it.
                self.attendees
                    .find_by_event_and_external_id(event.id(), cmd.external_user_id)
                    .await?
                    .ok_or_else(|| {
                        RegistrationError::Infrastructure(
                            "Attendee vanished after uniqueness conflict".to_string(),
                        )
                    })
            }
        }
    }

    async fn issue_ticket(
        &self,
        attendee: &Attendee,
        event: &Event,
    ) -> Result<Ticket, RegistrationError> {
        if self.idempotent_tickets {
            if let Some(existing) = self.tickets.find_active_by_attendee(attendee.id()).await? {
                tracing::info!(
                    ticket_no = %existing.ticket_no(),
                    "Reusing existing active ticket"
                );
                return Ok(existing);
            }
        }

        let ticket = Ticket::issue(
            TicketId::new(),
            *event.id(),
            *attendee.id(),
            TicketNo::generate(),
            Timestamp::now(),
        );
        self.tickets.insert(&ticket).await?;
        Ok(ticket)
    }

    /// Fire-and-forget confirmation. Failures are logged and swallowed so
    /// a slow or broken provider never rolls back or stalls registration.
    fn spawn_confirmation(&self, cmd: &RegisterAttendeeCommand, ticket: &Ticket, event: &Event) {
        let notifier = self.notifier.clone();
        let recipient = cmd.external_user_id;
        let text = confirmation_text(event, ticket);

        tokio::spawn(async move {
            if let Err(e) = notifier.send(recipient, &text).await {
                tracing::error!(error = %e, recipient = %recipient, "Failed to send confirmation");
            }
        });
    }
}

fn confirmation_text(event: &Event, ticket: &Ticket) -> String {
    format!(
        "\u{2705} <b>Registration Confirmed!</b>\n\n\
         \u{1F4C5} Event: <b>{}</b>\n\
         \u{1F3AB} Ticket: <code>{}</code>\n\
         \u{1F4CD} Location: {}\n\
         \u{1F552} Start: {}\n\
         \u{1F552} End: {}\n\n\
         Please save your QR code for check-in.",
        event.title(),
        ticket.ticket_no(),
        event.location().unwrap_or("TBA"),
        event.start_at(),
        event.end_at(),
    )
}
