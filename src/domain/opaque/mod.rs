//! Opaque external identifiers.
//!
//! Internal ids are never exposed raw; they cross the boundary as
//! salt-derived opaque strings so ordinal values cannot be enumerated.

mod codec;

pub use codec::OpaqueIdCodec;
