//! Ticket lifecycle status.

use serde::{Deserialize, Serialize};

use super::StateMachine;

/// Status of a ticket.
///
/// "Checked in" is not a status of its own; it is derived from the
/// check-in instant being set on an Active ticket. Revocation is assigned
/// externally and is terminal: a Revoked ticket can never check in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    /// Ticket is valid for check-in (initial state).
    Active,
    /// Ticket was revoked. Terminal.
    Revoked,
}

impl TicketStatus {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Revoked => "REVOKED",
        }
    }

    /// Parses the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(TicketStatus::Active),
            "REVOKED" => Some(TicketStatus::Revoked),
            _ => None,
        }
    }
}

impl StateMachine for TicketStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TicketStatus::*;
        matches!((self, target), (Active, Revoked))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TicketStatus::*;
        match self {
            Active => vec![Revoked],
            Revoked => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_can_be_revoked() {
        let status = TicketStatus::Active.transition_to(TicketStatus::Revoked);
        assert_eq!(status, Ok(TicketStatus::Revoked));
    }

    #[test]
    fn revoked_is_terminal() {
        assert!(TicketStatus::Revoked.is_terminal());
        assert!(TicketStatus::Revoked
            .transition_to(TicketStatus::Active)
            .is_err());
    }

    #[test]
    fn string_form_roundtrips() {
        for status in [TicketStatus::Active, TicketStatus::Revoked] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }
}
