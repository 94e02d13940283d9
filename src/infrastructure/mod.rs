//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps) and eviction
//! - Transports (Axiom HTTP, console, fan-out)
//! - Environment configuration
//! - The `AxiomLogger` façade wiring everything together

pub mod clock;
pub mod config;
pub mod eviction;
pub mod logger;
pub mod storage;
pub mod transport;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for the
/// clock, the transport, the notifier and `tracing` output.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// workflow-logger = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
