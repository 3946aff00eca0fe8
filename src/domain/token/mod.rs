//! Signed check-in tokens.
//!
//! A token is the plaintext fields of a ticket plus a keyed-hash signature
//! proving they were issued by the service holding the shared secret.
//! Verification always recomputes the digest; there is no offline scheme.

mod payload;
mod signer;

pub use payload::{ParsedToken, TokenPayload};
pub use signer::{hex_encode, TicketSigner};
