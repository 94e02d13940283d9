//! Domain layer - pure logic with no I/O.
//!
//! This layer contains the core concepts and invariants of the logging client:
//! - Field allowlists and payload redaction
//! - Error signature computation
//! - The outgoing event model
//!
//! All types in this layer are pure and easily testable.

pub mod allowlist;
pub mod event;
pub mod redact;
pub mod signature;
