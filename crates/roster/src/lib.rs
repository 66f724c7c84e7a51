//! Attendee roster.
//!
//! The roster is the registration export loaded once at startup. Every row
//! gets a derived [`Identifier`]: the order number cut to its significant
//! prefix. Scans are matched against that key.

pub mod identifier;
pub mod roster;

pub use identifier::{Identifier, IDENTIFIER_LEN};
pub use roster::{Attendee, Roster};
