//! Opaque id codec configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Opaque id codec configuration
///
/// A single static salt; rotation is unsupported and would invalidate
/// every previously issued opaque identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct OpaqueIdConfig {
    /// Salt for the opaque id codec
    pub salt: String,

    /// Minimum length of encoded identifiers
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

impl OpaqueIdConfig {
    /// Validate opaque id configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.salt.is_empty() {
            return Err(ValidationError::MissingRequired("OPAQUE_SALT"));
        }
        if self.min_length == 0 || self.min_length > 64 {
            return Err(ValidationError::InvalidOpaqueMinLength);
        }
        Ok(())
    }
}

impl Default for OpaqueIdConfig {
    fn default() -> Self {
        Self {
            salt: String::new(),
            min_length: default_min_length(),
        }
    }
}

fn default_min_length() -> usize {
    6
}
