//! Error signature computation for notification deduplication.
//!
//! An error signature identifies a class of error occurrences based on:
//! - Error kind (the short type name, or an explicit category)
//! - Error message text
//!
//! Occurrences with the same signature are considered "duplicates" by the
//! deduplication cache. Nothing that differs per occurrence (timestamps,
//! backtraces, source chains, payloads) takes part in the hash.

use ahash::AHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identity for an error occurrence.
///
/// Two errors with the same kind and message produce the same signature for
/// the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorSignature(u64);

impl ErrorSignature {
    /// Compute a signature from an error kind and message.
    ///
    /// `AHasher::default()` uses fixed keys, so the result does not change
    /// between calls. Each component is hashed separately (`str` hashing
    /// appends a terminator), so `("ab", "c")` and `("a", "bc")` differ.
    pub fn new(kind: &str, message: &str) -> Self {
        let mut hasher = AHasher::default();
        kind.hash(&mut hasher);
        message.hash(&mut hasher);
        ErrorSignature(hasher.finish())
    }

    /// Get the raw hash value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ErrorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
