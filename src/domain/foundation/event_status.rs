//! Event lifecycle status.

use serde::{Deserialize, Serialize};

use super::StateMachine;

/// Status of an event.
///
/// Transitions are externally driven (admin action), but they gate both
/// registration and check-in: a Closed event accepts no new registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    /// Event is being prepared and is not publicly listed.
    Draft,
    /// Event is live and accepting registrations.
    Published,
    /// Event is closed; registration is refused. Terminal.
    Closed,
}

impl EventStatus {
    /// True unless the event is Closed.
    ///
    /// Draft events still accept registrations (e.g. invite-only testing
    /// before publishing); only Closed refuses.
    pub fn accepts_registration(&self) -> bool {
        !matches!(self, EventStatus::Closed)
    }

    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Closed => "CLOSED",
        }
    }

    /// Parses the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(EventStatus::Draft),
            "PUBLISHED" => Some(EventStatus::Published),
            "CLOSED" => Some(EventStatus::Closed),
            _ => None,
        }
    }
}

impl StateMachine for EventStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EventStatus::*;
        matches!(
            (self, target),
            (Draft, Published) | (Draft, Closed) | (Published, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EventStatus::*;
        match self {
            Draft => vec![Published, Closed],
            Published => vec![Closed],
            Closed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_and_published_accept_registration() {
        assert!(EventStatus::Draft.accepts_registration());
        assert!(EventStatus::Published.accepts_registration());
    }

    #[test]
    fn closed_refuses_registration() {
        assert!(!EventStatus::Closed.accepts_registration());
    }

    #[test]
    fn closed_is_terminal() {
        assert!(EventStatus::Closed.is_terminal());
        assert!(!EventStatus::Draft.is_terminal());
        assert!(!EventStatus::Published.is_terminal());
    }

    #[test]
    fn publish_then_close_is_valid() {
        let status = EventStatus::Draft;
        let status = status.transition_to(EventStatus::Published).unwrap();
        let status = status.transition_to(EventStatus::Closed).unwrap();
        assert_eq!(status, EventStatus::Closed);
    }

    #[test]
    fn reopening_a_closed_event_is_invalid() {
        let result = EventStatus::Closed.transition_to(EventStatus::Published);
        assert!(result.is_err());
    }

    #[test]
    fn string_form_roundtrips() {
        for status in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Closed,
        ] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert_eq!(EventStatus::parse("ARCHIVED"), None);
    }
}
