//! Deterministic, pure logic for the page's interaction state machines.
//!
//! Core modules must be free of I/O and timers. They operate on in-memory
//! state and return deterministic outcomes; the [`crate::controller`] layer
//! owns scheduling.

pub mod carousel;
pub mod consultation;
pub mod invariants;
pub mod types;
pub mod validation;
