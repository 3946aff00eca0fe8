//! Human-facing event codes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Characters used in generated codes. Ambiguous glyphs (I, O, 0, 1) are
/// excluded so codes survive being read aloud or retyped.
const ALPHANUM: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random suffix after the `EVT` prefix.
const SUFFIX_LEN: usize = 7;

/// Maximum stored length of a code.
pub const MAX_CODE_LENGTH: usize = 32;

/// Immutable, globally unique human-facing event code (e.g. `EVT7KQ2MXR`).
///
/// Generated once at event creation and never mutated. Uniqueness against
/// the store is the creator's responsibility (regenerate on collision).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCode(String);

impl EventCode {
    /// Generates a fresh candidate code.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut code = String::with_capacity(3 + SUFFIX_LEN);
        code.push_str("EVT");
        for _ in 0..SUFFIX_LEN {
            let idx = rng.gen_range(0..ALPHANUM.len());
            code.push(ALPHANUM[idx] as char);
        }
        Self(code)
    }

    /// Wraps an existing code (reconstitution, inbound requests).
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.is_empty() {
            return Err(ValidationError::empty_field("event_code"));
        }
        if code.len() > MAX_CODE_LENGTH {
            return Err(ValidationError::too_long("event_code", MAX_CODE_LENGTH, code.len()));
        }
        Ok(Self(code))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_expected_shape() {
        let code = EventCode::generate();
        let s = code.as_str();
        assert_eq!(s.len(), 10);
        assert!(s.starts_with("EVT"));
        assert!(s[3..].bytes().all(|b| ALPHANUM.contains(&b)));
    }

    #[test]
    fn generated_codes_vary() {
        let a = EventCode::generate();
        let b = EventCode::generate();
        // 32^7 possibilities; a collision here means the RNG is broken.
        assert_ne!(a, b);
    }

    #[test]
    fn new_rejects_empty_code() {
        assert!(EventCode::new("").is_err());
    }

    #[test]
    fn new_rejects_overlong_code() {
        assert!(EventCode::new("X".repeat(33)).is_err());
    }

    #[test]
    fn new_accepts_existing_code() {
        let code = EventCode::new("EVT1234567").unwrap();
        assert_eq!(code.as_str(), "EVT1234567");
    }
}
