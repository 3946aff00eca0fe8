//! Feature flags

use serde::Deserialize;

/// Feature flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureFlags {
    /// Reuse an attendee's existing active ticket on retried registration
    /// calls instead of issuing a new ticket per call.
    ///
    /// Off by default: a registration call issues one ticket per call,
    /// even for an existing attendee.
    #[serde(default)]
    pub idempotent_tickets: bool,
}
