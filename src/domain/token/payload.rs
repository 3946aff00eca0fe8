//! Check-in token wire format.
//!
//! A scannable token is a flat query-string, not JSON:
//!
//! ```text
//! t=<ticket-id>&e=<event-code>&ts=<epoch-seconds>&sig=<hex-hmac>
//! ```
//!
//! The signature covers exactly the three fields before it, in that order,
//! with no trailing `&`. The verifying side accepts the token bare or as
//! the query portion of a full URL (split on the first `?`).

use std::collections::HashMap;

use super::signer::TicketSigner;

/// The three signed fields of a check-in token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    ticket_id: String,
    event_code: String,
    issued_ts: String,
}

impl TokenPayload {
    /// Builds the payload for a freshly issued ticket.
    pub fn new(
        ticket_id: impl Into<String>,
        event_code: impl Into<String>,
        issued_at_epoch_secs: i64,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            event_code: event_code.into(),
            issued_ts: issued_at_epoch_secs.to_string(),
        }
    }

    /// The raw ticket id field (`t=`).
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    /// The event code field (`e=`).
    pub fn event_code(&self) -> &str {
        &self.event_code
    }

    /// The issued-at field (`ts=`), as carried on the wire.
    pub fn issued_ts(&self) -> &str {
        &self.issued_ts
    }

    /// The canonical base string the signature is computed over.
    pub fn base_string(&self) -> String {
        format!(
            "t={}&e={}&ts={}",
            self.ticket_id, self.event_code, self.issued_ts
        )
    }

    /// Produces the full signed token, `sig=` appended last.
    pub fn into_signed(self, signer: &TicketSigner) -> String {
        let base = self.base_string();
        let sig = signer.sign(&base);
        format!("{}&sig={}", base, sig)
    }
}

/// A parsed, not-yet-verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    /// The three signed fields.
    pub payload: TokenPayload,
    /// The claimed signature, exactly as received.
    pub signature: String,
}

impl ParsedToken {
    /// Parses a scanned token.
    ///
    /// Accepts the bare token or a full URL (everything before the first
    /// `?` is discarded). Returns `None` unless all four required fields
    /// are present and non-empty; no other validation happens here.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut s = raw.trim();
        if let Some(idx) = s.find('?') {
            s = &s[idx + 1..];
        }

        let mut fields: HashMap<String, String> = HashMap::new();
        for part in s.split('&') {
            let Some(eq) = part.find('=') else { continue };
            if eq == 0 {
                continue;
            }
            let key = percent_decode(&part[..eq]);
            let value = percent_decode(&part[eq + 1..]);
            fields.insert(key, value);
        }

        let ticket_id = non_empty(fields.remove("t"))?;
        let event_code = non_empty(fields.remove("e"))?;
        let issued_ts = non_empty(fields.remove("ts"))?;
        let signature = non_empty(fields.remove("sig"))?;

        Some(Self {
            payload: TokenPayload {
                ticket_id,
                event_code,
                issued_ts,
            },
            signature,
        })
    }

    /// Verifies the claimed signature over the signed base string.
    pub fn verify(&self, signer: &TicketSigner) -> bool {
        signer.verify(&self.payload.base_string(), &self.signature)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Minimal application/x-www-form-urlencoded decoding: `+` becomes space,
/// `%XX` becomes the byte it names, and malformed escapes pass through
/// unchanged.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match hex_pair(bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: Option<u8>, lo: Option<u8>) -> Option<u8> {
    let hi = (hi? as char).to_digit(16)? as u8;
    let lo = (lo? as char).to_digit(16)? as u8;
    Some((hi << 4) | lo)
}
