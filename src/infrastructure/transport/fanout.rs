//! Fan-out over several transports.

use crate::application::ports::Transport;
use crate::domain::event::Event;
use crate::error::TransportError;
use std::panic;
use std::sync::Arc;

/// Sends every event to each inner transport.
///
/// Every sink is attempted even after a failure. The send succeeds only if
/// all sinks succeed; otherwise the first failure is reported inside
/// `TransportError::Partial`.
#[derive(Debug, Clone, Default)]
pub struct FanoutTransport {
    sinks: Vec<Arc<dyn Transport>>,
}

impl FanoutTransport {
    /// Create a fan-out over the given sinks.
    pub fn new(sinks: Vec<Arc<dyn Transport>>) -> Self {
        Self { sinks }
    }

    /// Add a sink.
    pub fn with_sink(mut self, sink: Arc<dyn Transport>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if there are no sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Transport for FanoutTransport {
    fn send(&self, event: &Event) -> Result<(), TransportError> {
        let mut failed = 0;
        let mut first = None;

        for sink in &self.sinks {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| sink.send(event)))
                .unwrap_or(Err(TransportError::Panicked));
            if let Err(err) = result {
                failed += 1;
                first.get_or_insert(err);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(TransportError::Partial {
                failed,
                attempted: self.sinks.len(),
                first: Box::new(first),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{Fields, Level};
    use crate::infrastructure::mocks::MockTransport;
    use chrono::Utc;

    fn event() -> Event {
        Event {
            level: Level::Info,
            service_name: "svc".into(),
            timestamp: Utc::now(),
            message: Some("hello".into()),
            error_kind: None,
            error_message: None,
            error_sources: Vec::new(),
            exclude_from_notification: false,
            context: Fields::new(),
            data: Fields::new(),
        }
    }

    #[test]
    fn test_all_sinks_receive_event() {
        let a = MockTransport::new();
        let b = MockTransport::new();
        let fanout = FanoutTransport::default()
            .with_sink(Arc::new(a.clone()))
            .with_sink(Arc::new(b.clone()));

        assert!(fanout.send(&event()).is_ok());
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 1);
        assert_eq!(fanout.len(), 2);
    }

    #[test]
    fn test_failure_does_not_stop_later_sinks() {
        let failing = MockTransport::new();
        failing.set_failing(true);
        let panicking = MockTransport::panicking();
        let healthy = MockTransport::new();
        let fanout = FanoutTransport::new(vec![
            Arc::new(failing),
            Arc::new(panicking),
            Arc::new(healthy.clone()),
        ]);

        let err = fanout.send(&event()).unwrap_err();

        assert_eq!(healthy.count(), 1);
        match err {
            TransportError::Partial {
                failed,
                attempted,
                first,
            } => {
                assert_eq!(failed, 2);
                assert_eq!(attempted, 3);
                assert!(matches!(*first, TransportError::Other(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
