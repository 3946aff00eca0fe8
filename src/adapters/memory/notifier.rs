//! Recording Notifier
//!
//! Captures sends instead of delivering them; can be switched to fail to
//! exercise the best-effort contract.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ExternalUserId;
use crate::ports::{Notifier, NotifyError};

/// In-memory implementation of `Notifier` that records every send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<(ExternalUserId, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every send.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            fail: false,
        }
    }

    /// Create a notifier that fails every send.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            fail: true,
        }
    }

    /// Messages recorded so far.
    pub async fn sent(&self) -> Vec<(ExternalUserId, String)> {
        self.sent.read().await.clone()
    }

    /// Number of recorded sends.
    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: ExternalUserId, text: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Provider("simulated delivery failure".to_string()));
        }
        self.sent.write().await.push((recipient, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends() {
        let notifier = RecordingNotifier::new();
        notifier
            .send(ExternalUserId::new(42), "hello")
            .await
            .unwrap();

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.as_i64(), 42);
        assert_eq!(sent[0].1, "hello");
    }

    #[tokio::test]
    async fn failing_notifier_fails() {
        let notifier = RecordingNotifier::failing();
        let result = notifier.send(ExternalUserId::new(42), "hello").await;
        assert!(result.is_err());
        assert_eq!(notifier.sent_count().await, 0);
    }
}
