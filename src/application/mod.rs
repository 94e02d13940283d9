//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Deduplication cache (which errors should notify)
//! - Event builder (assembly and redaction)
//! - Log dispatcher (the path behind `error`, `warning`, `info`)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod builder;
pub mod dedup;
pub mod dispatcher;
pub mod metrics;
pub mod ports;
