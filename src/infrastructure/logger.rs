//! The public logging client.
//!
//! [`AxiomLogger`] wires the application layer to concrete adapters: the
//! system clock, sharded storage for the deduplication cache, and one or more
//! transports. Use [`AxiomLogger::new`] for the environment-driven default or
//! [`AxiomLogger::builder`] for full control.

use crate::application::{
    builder::EventBuilder,
    dedup::{DedupEntry, DeduplicationCache, DEFAULT_DEDUP_WINDOW, DEFAULT_MAX_SIGNATURES},
    dispatcher::LogDispatcher,
    metrics::Metrics,
    ports::{Clock, Notifier, Transport},
};
use crate::domain::allowlist::{AllowList, DEFAULT_ALLOWED_FIELDS};
use crate::domain::event::ErrorInfo;
use crate::domain::redact::Redactor;
use crate::domain::signature::ErrorSignature;
use crate::error::BuildError;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::AxiomConfig;
use crate::infrastructure::eviction::LruEviction;
use crate::infrastructure::storage::ShardedStorage;
use crate::infrastructure::transport::{ConsoleTransport, FanoutTransport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Storage backing the deduplication cache.
pub type DedupStorage = Arc<ShardedStorage<ErrorSignature, DedupEntry>>;

/// Key whose string value is parsed as JSON when body unwrapping is enabled.
pub const DEFAULT_EMBEDDED_JSON_KEY: &str = "body";

/// Builder for constructing an `AxiomLogger`.
pub struct AxiomLoggerBuilder {
    service_name: String,
    allowed_fields: Vec<String>,
    allowed_patterns: Vec<String>,
    dedup_window: Duration,
    max_signatures: Option<usize>,
    clock: Option<Arc<dyn Clock>>,
    transport: Option<Arc<dyn Transport>>,
    axiom_config: Option<AxiomConfig>,
    axiom_output: Option<bool>,
    console_output: bool,
    notifier: Option<Arc<dyn Notifier>>,
    embedded_json_keys: Vec<String>,
}

impl AxiomLoggerBuilder {
    fn new(service_name: String) -> Self {
        Self {
            service_name,
            allowed_fields: DEFAULT_ALLOWED_FIELDS.iter().map(|f| f.to_string()).collect(),
            allowed_patterns: Vec::new(),
            dedup_window: DEFAULT_DEDUP_WINDOW,
            max_signatures: Some(DEFAULT_MAX_SIGNATURES),
            clock: None,
            transport: None,
            axiom_config: None,
            axiom_output: None,
            console_output: false,
            notifier: None,
            embedded_json_keys: Vec::new(),
        }
    }

    /// Replace the allowlist of field names (and dotted paths).
    ///
    /// Defaults to `["id"]`. Matching ignores ASCII case.
    pub fn with_allowed_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add regex allowlist entries, matched against key names and dotted paths.
    ///
    /// Patterns are compiled when `build()` is called.
    pub fn with_allowed_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the error notification suppression window.
    ///
    /// The window will be validated when `build()` is called.
    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Set the maximum number of tracked error signatures.
    ///
    /// When the limit is reached, stale signatures are swept and then the
    /// least recently seen one is evicted.
    ///
    /// Defaults to 10,000 signatures.
    pub fn with_max_signatures(mut self, max_signatures: usize) -> Self {
        self.max_signatures = Some(max_signatures);
        self
    }

    /// Disable the signature limit.
    ///
    /// **Warning**: only use when the set of distinct error messages is
    /// bounded, otherwise memory grows without limit.
    pub fn with_unlimited_signatures(mut self) -> Self {
        self.max_signatures = None;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Send events through a custom transport.
    ///
    /// Axiom output is turned off unless re-enabled with
    /// `with_axiom_output(true)`.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use explicit Axiom settings instead of reading the environment.
    pub fn with_axiom_config(mut self, config: AxiomConfig) -> Self {
        self.axiom_config = Some(config);
        self
    }

    /// Enable or disable the Axiom HTTP output.
    pub fn with_axiom_output(mut self, enabled: bool) -> Self {
        self.axiom_output = Some(enabled);
        self
    }

    /// Also write every event as a JSON line to stdout.
    pub fn with_console_output(mut self, enabled: bool) -> Self {
        self.console_output = enabled;
        self
    }

    /// Announce first-seen errors through a notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Parse and redact JSON carried as a string under `body` keys.
    pub fn with_body_unwrapping(self) -> Self {
        self.with_embedded_json_keys([DEFAULT_EMBEDDED_JSON_KEY])
    }

    /// Parse and redact JSON carried as a string under these keys.
    pub fn with_embedded_json_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embedded_json_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    /// Returns `BuildError` if:
    /// - the service name is empty
    /// - `max_signatures` is zero or the dedup window is zero
    /// - an allowlist pattern is not a valid regex
    /// - Axiom output is enabled and `AXIOM_TOKEN` is missing or
    ///   `AXIOM_DATASET` is not a valid dataset name
    /// - no output is enabled
    pub fn build(self) -> Result<AxiomLogger, BuildError> {
        let service_name = self.service_name.trim().to_string();
        if service_name.is_empty() {
            return Err(BuildError::EmptyServiceName);
        }
        if self.max_signatures == Some(0) {
            return Err(BuildError::ZeroMaxSignatures);
        }
        if self.dedup_window.is_zero() {
            return Err(BuildError::ZeroDedupWindow(self.dedup_window));
        }

        let allowlist = AllowList::new(&self.allowed_fields).with_patterns(&self.allowed_patterns)?;
        let redactor =
            Redactor::new(Arc::new(allowlist)).with_embedded_json_keys(&self.embedded_json_keys);

        let metrics = Metrics::new();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let storage: DedupStorage = Arc::new(ShardedStorage::new());
        let mut cache = DeduplicationCache::new(storage, Arc::clone(&clock), self.dedup_window)
            .with_metrics(metrics.clone());
        if let Some(max) = self.max_signatures {
            cache = cache.with_eviction_policy(Arc::new(LruEviction::new(max)));
        }

        let mut sinks: Vec<Arc<dyn Transport>> = Vec::new();
        if let Some(transport) = self.transport {
            sinks.push(transport);
        }
        let axiom_enabled = self
            .axiom_output
            .unwrap_or(cfg!(feature = "axiom") && sinks.is_empty());
        if axiom_enabled {
            sinks.push(axiom_transport(self.axiom_config)?);
        }
        if self.console_output {
            sinks.push(Arc::new(ConsoleTransport::stdout()));
        }
        let transport: Arc<dyn Transport> = match sinks.len() {
            0 => return Err(BuildError::NoOutput),
            1 => Arc::clone(&sinks[0]),
            _ => Arc::new(FanoutTransport::new(sinks)),
        };

        debug!(
            service = %service_name,
            window = ?self.dedup_window,
            max_signatures = ?self.max_signatures,
            "axiom logger ready"
        );

        let mut dispatcher = LogDispatcher::new(
            EventBuilder::new(service_name, redactor),
            cache,
            transport,
            clock,
            metrics,
        );
        if let Some(notifier) = self.notifier {
            dispatcher = dispatcher.with_notifier(notifier);
        }

        Ok(AxiomLogger {
            dispatcher: Arc::new(dispatcher),
        })
    }
}

#[cfg(feature = "axiom")]
fn axiom_transport(config: Option<AxiomConfig>) -> Result<Arc<dyn Transport>, BuildError> {
    use crate::infrastructure::transport::AxiomTransport;

    let config = match config {
        Some(config) => config,
        None => AxiomConfig::from_env()?,
    };
    Ok(Arc::new(AxiomTransport::new(&config)?))
}

#[cfg(not(feature = "axiom"))]
fn axiom_transport(_config: Option<AxiomConfig>) -> Result<Arc<dyn Transport>, BuildError> {
    Err(BuildError::AxiomUnavailable)
}

/// Structured-event logging client for one service.
///
/// Cheap to clone; clones share the deduplication cache and metrics.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use workflow_logger::infrastructure::mocks::MockTransport;
/// use workflow_logger::{AxiomLogger, ErrorInfo};
///
/// let transport = MockTransport::new();
/// let logger = AxiomLogger::builder("checkout")
///     .with_allowed_fields(["id", "status"])
///     .with_transport(Arc::new(transport.clone()))
///     .build()
///     .unwrap();
///
/// let err = ErrorInfo::new("PaymentError", "card declined");
/// assert!(logger.error(err, Some(json!({"step": "charge"})), Some(json!({"id": 1, "card": "4242"}))));
///
/// let sent = transport.last().unwrap();
/// assert_eq!(sent.data["card"], "[REDACTED]");
/// ```
#[derive(Debug, Clone)]
pub struct AxiomLogger {
    dispatcher: Arc<LogDispatcher<DedupStorage>>,
}

impl AxiomLogger {
    /// Create a logger that sends to Axiom, configured from the environment.
    ///
    /// `allowed_fields` defaults to `["id"]` when `None` or empty. Use the
    /// builder with an empty `with_allowed_fields` to redact every key.
    ///
    /// # Errors
    /// Returns `BuildError::Config` if `AXIOM_TOKEN` is missing.
    pub fn new(
        service_name: impl Into<String>,
        allowed_fields: Option<Vec<String>>,
    ) -> Result<Self, BuildError> {
        let mut builder = Self::builder(service_name);
        if let Some(fields) = allowed_fields.filter(|fields| !fields.is_empty()) {
            builder = builder.with_allowed_fields(fields);
        }
        builder.build()
    }

    /// Create a builder for configuring the logger.
    pub fn builder(service_name: impl Into<String>) -> AxiomLoggerBuilder {
        AxiomLoggerBuilder::new(service_name.into())
    }

    /// Forward an error.
    ///
    /// Accepts an [`ErrorInfo`] or a reference to any `std::error::Error`.
    /// The record is always sent; only the notification is deduplicated.
    /// Returns whether the transport accepted the record.
    pub fn error<E>(&self, error: E, context: Option<Value>, data: Option<Value>) -> bool
    where
        E: Into<ErrorInfo>,
    {
        self.dispatcher.error(error.into(), context, data)
    }

    /// Forward a warning. Returns whether the transport accepted it.
    pub fn warning(
        &self,
        message: impl Into<String>,
        context: Option<Value>,
        data: Option<Value>,
    ) -> bool {
        self.dispatcher.warning(message.into(), context, data)
    }

    /// Forward an informational message. Returns whether the transport accepted it.
    pub fn info(&self, message: impl Into<String>, context: Option<Value>, data: Option<Value>) -> bool {
        self.dispatcher.info(message.into(), context, data)
    }

    /// The service name stamped on every event.
    pub fn service_name(&self) -> &str {
        self.dispatcher.builder().service_name()
    }

    /// The allowlist applied to event data.
    pub fn allowlist(&self) -> &AllowList {
        self.dispatcher.builder().redactor().allowlist()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.dispatcher.metrics()
    }

    /// Number of error signatures currently tracked.
    pub fn signature_count(&self) -> usize {
        self.dispatcher.cache().len()
    }

    /// Drop signatures that have been idle long enough to be stale.
    ///
    /// Returns the number of signatures removed.
    pub fn purge_expired_signatures(&self) -> usize {
        self.dispatcher.cache().purge_stale()
    }
}
