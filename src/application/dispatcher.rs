//! Dispatch of logging calls.
//!
//! The dispatcher is the hot path behind `error`, `warning` and `info`:
//! decide notification (errors only), build the event, hand it to the
//! transport. Nothing that goes wrong past the caller's arguments reaches
//! the caller; failures turn into a `false` return and a `warn!` diagnostic.

use crate::application::builder::EventBuilder;
use crate::application::dedup::{DedupEntry, DeduplicationCache};
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Notifier, Storage, Transport};
use crate::domain::event::{ErrorInfo, Event, EventBody, Level};
use crate::domain::signature::ErrorSignature;
use crate::error::TransportError;
use serde_json::Value;
use std::panic;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes logging calls through deduplication, assembly and delivery.
#[derive(Debug, Clone)]
pub struct LogDispatcher<S>
where
    S: Storage<ErrorSignature, DedupEntry> + Clone,
{
    builder: EventBuilder,
    cache: DeduplicationCache<S>,
    transport: Arc<dyn Transport>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<S> LogDispatcher<S>
where
    S: Storage<ErrorSignature, DedupEntry> + Clone,
{
    /// Create a new dispatcher.
    ///
    /// # Arguments
    /// * `builder` - Event assembly (service name and redactor)
    /// * `cache` - Deduplication cache for error notifications
    /// * `transport` - Delivery adapter
    /// * `clock` - Source of event timestamps
    /// * `metrics` - Metrics tracker
    pub fn new(
        builder: EventBuilder,
        cache: DeduplicationCache<S>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
    ) -> Self {
        Self {
            builder,
            cache,
            transport,
            notifier: None,
            clock,
            metrics,
        }
    }

    /// Attach a notification channel for first-seen errors.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Forward an error event.
    ///
    /// The event is always sent. The deduplication decision only sets
    /// `exclude_from_notification` and gates the notifier.
    pub fn error(&self, error: ErrorInfo, context: Option<Value>, data: Option<Value>) -> bool {
        let notify = self.should_notify(error.signature());
        self.metrics.record_notification(notify);

        let event = self.builder.build(
            Level::Error,
            EventBody::Error(error),
            context,
            data,
            self.clock.wall_time(),
            !notify,
        );

        let sent = self.dispatch(&event);
        if notify {
            self.notify(&event);
        }
        sent
    }

    /// Forward a warning event.
    pub fn warning(&self, message: String, context: Option<Value>, data: Option<Value>) -> bool {
        self.message(Level::Warning, message, context, data)
    }

    /// Forward an informational event.
    pub fn info(&self, message: String, context: Option<Value>, data: Option<Value>) -> bool {
        self.message(Level::Info, message, context, data)
    }

    fn message(
        &self,
        level: Level,
        message: String,
        context: Option<Value>,
        data: Option<Value>,
    ) -> bool {
        let event = self.builder.build(
            level,
            EventBody::Message(message),
            context,
            data,
            self.clock.wall_time(),
            false,
        );
        self.dispatch(&event)
    }

    fn should_notify(&self, signature: ErrorSignature) -> bool {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.cache.check(signature)));
        match result {
            Ok(notify) => notify,
            Err(_) => {
                // Fail open: a duplicate notification beats a lost one
                warn!(signature = %signature, "deduplication check panicked, notifying");
                true
            }
        }
    }

    fn dispatch(&self, event: &Event) -> bool {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.transport.send(event)))
            .unwrap_or(Err(TransportError::Panicked));

        match result {
            Ok(()) => {
                self.metrics.record_forwarded();
                debug!(
                    service = %event.service_name,
                    level = %event.level,
                    "forwarded log event"
                );
                true
            }
            Err(err) => {
                self.metrics.record_failed();
                warn!(
                    service = %event.service_name,
                    event = %event.format_brief(),
                    error = %err,
                    "failed to forward log event"
                );
                false
            }
        }
    }

    fn notify(&self, event: &Event) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| notifier.notify(event)));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(
                service = %event.service_name,
                error = %err,
                "failed to send error notification"
            ),
            Err(_) => warn!(service = %event.service_name, "error notifier panicked"),
        }
    }

    /// The event builder.
    pub fn builder(&self) -> &EventBuilder {
        &self.builder
    }

    /// The deduplication cache.
    pub fn cache(&self) -> &DeduplicationCache<S> {
        &self.cache
    }

    /// The metrics tracker.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
