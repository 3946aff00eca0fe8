//! Event aggregate and its value objects.

mod aggregate;
mod code;

pub use aggregate::{Event, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use code::{EventCode, MAX_CODE_LENGTH};
