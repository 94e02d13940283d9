//! Eviction policy adapters for signature management.
//!
//! These adapters implement the `EvictionPolicy` port used by the
//! deduplication cache to stay within its entry bound.

pub mod lru;

pub use lru::LruEviction;
