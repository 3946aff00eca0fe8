//! Token signing configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Minimum accepted secret length.
const MIN_SECRET_LENGTH: usize = 16;

/// Token signing configuration
///
/// The shared secret behind every issued check-in token. Loaded once at
/// startup; rotating it invalidates all outstanding tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    /// Shared HMAC secret for QR payloads
    pub secret: SecretString,
}

impl SigningConfig {
    /// Validate signing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("SIGNING_SECRET"));
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ValidationError::SigningSecretTooShort);
        }
        Ok(())
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::new(String::new()),
        }
    }
}
