//! HMAC signer for ticket tokens.
//!
//! # Security
//!
//! - HMAC-SHA256 over the canonical base string
//! - Constant-time, case-insensitive digest comparison
//! - Secret handled via `secrecy::SecretString`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies ticket token base strings with a shared secret.
///
/// The secret is injected once at construction and never mutated; the
/// signer is safe to share across request tasks.
#[derive(Clone)]
pub struct TicketSigner {
    secret: SecretString,
}

impl TicketSigner {
    /// Creates a signer from the configured shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Computes the lowercase hex HMAC-SHA256 digest of `message`.
    ///
    /// Deterministic: the same (secret, message) always yields the same
    /// digest.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    /// Verifies a provided signature against the recomputed digest.
    ///
    /// Comparison is case-insensitive and constant-time.
    pub fn verify(&self, message: &str, provided_sig: &str) -> bool {
        let expected = self.sign(message);
        let provided = provided_sig.to_ascii_lowercase();
        expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() == 1
    }
}

impl std::fmt::Debug for TicketSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketSigner").finish_non_exhaustive()
    }
}

/// Encode bytes to lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TicketSigner {
        TicketSigner::new("test-secret")
    }

    #[test]
    fn sign_is_deterministic() {
        let s = signer();
        let base = "t=abc&e=EVT1234567&ts=1700000000";
        assert_eq!(s.sign(base), s.sign(base));
    }

    #[test]
    fn sign_produces_lowercase_hex_sha256_digest() {
        let sig = signer().sign("t=abc&e=EVT1234567&ts=1700000000");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn changing_message_changes_digest() {
        let s = signer();
        assert_ne!(
            s.sign("t=abc&e=EVT1234567&ts=1700000000"),
            s.sign("t=abc&e=EVT1234567&ts=1700000001")
        );
    }

    #[test]
    fn changing_secret_changes_digest() {
        let base = "t=abc&e=EVT1234567&ts=1700000000";
        assert_ne!(
            TicketSigner::new("secret-a").sign(base),
            TicketSigner::new("secret-b").sign(base)
        );
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let s = signer();
        let base = "t=abc&e=EVT1234567&ts=1700000000";
        let sig = s.sign(base);
        assert!(s.verify(base, &sig));
    }

    #[test]
    fn verify_is_case_insensitive() {
        let s = signer();
        let base = "t=abc&e=EVT1234567&ts=1700000000";
        let sig = s.sign(base).to_ascii_uppercase();
        assert!(s.verify(base, &sig));
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let s = signer();
        let base = "t=abc&e=EVT1234567&ts=1700000000";
        let mut sig = s.sign(base);
        let flipped = if sig.ends_with('0') { '1' } else { '0' };
        sig.pop();
        sig.push(flipped);
        assert!(!s.verify(base, &sig));
    }

    #[test]
    fn verify_rejects_wrong_length_signature() {
        let s = signer();
        assert!(!s.verify("t=abc&e=EVT1234567&ts=1700000000", "deadbeef"));
    }

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
        assert_eq!(hex_encode(&[]), "");
    }
}
