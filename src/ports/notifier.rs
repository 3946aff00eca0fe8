//! Notification sender port.
//!
//! Delivery is best-effort: the registration path dispatches the send as a
//! detached task and only logs failures. Nothing in the critical path ever
//! awaits or propagates a notification error.

use crate::domain::foundation::ExternalUserId;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a notification send attempt.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification provider rejected the message: {0}")]
    Provider(String),
}

/// Port for outbound attendee notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt to deliver `text` to the attendee's messaging account.
    ///
    /// Implementations must bound their own timeout so a slow provider
    /// cannot stall callers that do choose to await.
    async fn send(&self, recipient: ExternalUserId, text: &str) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn Notifier) {}
    }

    #[test]
    fn notify_error_displays_cause() {
        let err = NotifyError::Transport("connection refused".to_string());
        assert_eq!(
            format!("{}", err),
            "Notification transport failed: connection refused"
        );
    }
}
