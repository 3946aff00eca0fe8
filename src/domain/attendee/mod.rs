//! Attendee aggregate.

mod aggregate;

pub use aggregate::{Attendee, MAX_NAME_LENGTH};
