//! Domain logic for the Atelier relay.
//!
//! Pure string and JSON manipulation with no I/O: the output filename
//! convention, workflow template slot filling, and the shared error type.
//! Everything here is synchronous and unit-tested inline.

pub mod error;
pub mod naming;
pub mod workflow;
