//! Ticketgate - Event Ticket Issuance and Gate Check-In
//!
//! This crate implements the ticket-trust pipeline behind an event
//! registration service: opaque external identifiers, signed scannable
//! tokens, idempotent registration, and the atomic check-in transition.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
