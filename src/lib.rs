//! # workflow-logger
//!
//! Structured-event logging client for Axiom with allowlist-based redaction
//! and deduplicated error notifications.
//!
//! Each logging call becomes one JSON document carrying a severity, the
//! service name, a timestamp, a message or error details, operator-supplied
//! context, and caller data. Caller data is redacted against an allowlist
//! before it leaves the process: every field whose name is not allowed is
//! replaced with `"[REDACTED]"`, at any depth.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use workflow_logger::AxiomLogger;
//!
//! // Reads AXIOM_TOKEN (required) and AXIOM_DATASET (default "local")
//! let logger = AxiomLogger::new("order-service", Some(vec!["id".into(), "status".into()]))
//!     .expect("AXIOM_TOKEN must be set");
//!
//! logger.info(
//!     "order accepted",
//!     Some(json!({"step": "validate"})),
//!     Some(json!({"id": 42, "status": "new", "email": "user@example.com"})),
//! );
//!
//! let err = "x".parse::<u32>().unwrap_err();
//! logger.error(&err, Some(json!({"step": "parse"})), None);
//! ```
//!
//! ## Redaction
//!
//! Redaction is allowlist-based, so new fields are hidden until someone
//! decides they are safe:
//!
//! - allowed key: the value is kept, nested mappings are redacted recursively
//! - any other key: the value becomes `"[REDACTED]"`, whatever its type
//! - sequences: mapping elements are redacted, other elements pass through
//!
//! Matching ignores ASCII case. Besides plain names, the allowlist accepts
//! dotted paths (`user.id`) and, through the builder, regular expressions.
//!
//! ```rust
//! use serde_json::json;
//! use workflow_logger::{redact, AllowList};
//!
//! let allowlist = AllowList::new(["id"]);
//! let redacted = redact(
//!     &json!({"user": {"id": 1, "ssn": "123"}, "items": [{"id": 2, "price": 9}]}),
//!     &allowlist,
//! );
//! assert_eq!(redacted, json!({"user": "[REDACTED]", "items": "[REDACTED]"}));
//!
//! let allowlist = AllowList::new(["id", "user", "items"]);
//! let redacted = redact(
//!     &json!({"user": {"id": 1, "ssn": "123"}, "items": [{"id": 2, "price": 9}]}),
//!     &allowlist,
//! );
//! assert_eq!(
//!     redacted,
//!     json!({"user": {"id": 1, "ssn": "[REDACTED]"}, "items": [{"id": 2, "price": "[REDACTED]"}]})
//! );
//! ```
//!
//! The `context` argument is never redacted. Only put operator-controlled
//! metadata there.
//!
//! ## Error Notification Deduplication
//!
//! Every error is forwarded. What is deduplicated is the notification: errors
//! with the same kind and message seen again within the window (5 seconds by
//! default) are sent with `_excludeFromSlackNotification: true` and do not
//! reach a configured [`Notifier`]. The window slides: each sighting restarts
//! it.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use workflow_logger::infrastructure::mocks::{MockNotifier, MockTransport};
//! use workflow_logger::{AxiomLogger, ErrorInfo};
//!
//! let transport = MockTransport::new();
//! let notifier = MockNotifier::new();
//! let logger = AxiomLogger::builder("importer")
//!     .with_transport(Arc::new(transport.clone()))
//!     .with_notifier(Arc::new(notifier.clone()))
//!     .with_dedup_window(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..3 {
//!     logger.error(ErrorInfo::new("TimeoutError", "upstream timed out"), None, None);
//! }
//!
//! assert_eq!(transport.count(), 3);
//! assert_eq!(notifier.count(), 1);
//! ```
//!
//! ## Memory Management
//!
//! By default the cache tracks up to 10,000 error signatures. When full,
//! signatures idle for more than twelve windows are swept, then the least
//! recently seen one is evicted. Use `with_max_signatures` to change the
//! limit, or `with_unlimited_signatures` when the set of error messages is
//! known to be bounded.
//!
//! ## Failure Handling
//!
//! Logging never fails the caller. `error`, `warning` and `info` return
//! `true` when the transport accepted the event and `false` otherwise;
//! failures (including panics inside a transport) are reported through
//! `tracing::warn!`. Configuration problems, such as a missing
//! `AXIOM_TOKEN`, surface as a [`BuildError`] when the logger is built.
//!
//! ## Outputs
//!
//! - Axiom ingest API over HTTPS (`axiom` feature, on by default)
//! - JSON lines on stdout (`with_console_output(true)`)
//! - any custom [`Transport`] (`with_transport`)
//!
//! ## Observability
//!
//! ```rust
//! # use std::sync::Arc;
//! # use workflow_logger::infrastructure::mocks::MockTransport;
//! # use workflow_logger::AxiomLogger;
//! # let logger = AxiomLogger::builder("svc")
//! #     .with_transport(Arc::new(MockTransport::new()))
//! #     .build()
//! #     .unwrap();
//! let snapshot = logger.metrics().snapshot();
//! println!("Forwarded: {}", snapshot.events_forwarded);
//! println!("Failed: {}", snapshot.events_failed);
//! println!("Suppression rate: {:.2}%", snapshot.suppression_rate() * 100.0);
//! ```

// Domain layer - pure logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

pub mod error;

pub use domain::{
    allowlist::{AllowList, FieldPattern, DEFAULT_ALLOWED_FIELDS},
    event::{ErrorInfo, Event, EventBody, Fields, Level},
    redact::{collect_redacted_paths, redact, Redactor, REDACTED},
    signature::ErrorSignature,
};

pub use application::{
    builder::EventBuilder,
    dedup::{DedupEntry, DeduplicationCache, DEFAULT_DEDUP_WINDOW, DEFAULT_MAX_SIGNATURES},
    dispatcher::LogDispatcher,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, EvictionPolicy, Notifier, Storage, Transport},
};

pub use error::{BuildError, ConfigError, NotifyError, TransportError};

pub use infrastructure::{
    clock::SystemClock,
    config::AxiomConfig,
    eviction::LruEviction,
    logger::{AxiomLogger, AxiomLoggerBuilder},
    storage::ShardedStorage,
    transport::{ConsoleTransport, FanoutTransport},
};

#[cfg(feature = "axiom")]
pub use infrastructure::transport::AxiomTransport;
