//! Mock transport and notifier for testing.

use crate::application::ports::{Notifier, Transport};
use crate::domain::event::Event;
use crate::error::{NotifyError, TransportError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Transport that records delivered events in memory.
///
/// Clones share the same record, so a test can keep a handle while the
/// logger owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    events: Arc<Mutex<Vec<Event>>>,
    failing: Arc<AtomicBool>,
    panics: bool,
}

impl MockTransport {
    /// Create a transport that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose `send` panics.
    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    /// Make subsequent sends fail (events are not recorded while failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all delivered events.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Get the most recent delivered event.
    pub fn last(&self) -> Option<Event> {
        self.events().pop()
    }

    /// Get the count of delivered events.
    pub fn count(&self) -> usize {
        self.events
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }

    /// Forget all delivered events.
    pub fn clear(&self) {
        self.events
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .clear();
    }
}

impl Transport for MockTransport {
    fn send(&self, event: &Event) -> Result<(), TransportError> {
        if self.panics {
            panic!("mock transport panicked");
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Other("mock transport unavailable".into()));
        }
        self.events
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
            .push(event.clone());
        Ok(())
    }
}

/// Notifier that records the events it was asked to announce.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notified: Arc<Mutex<Vec<Event>>>,
    failing: Arc<AtomicBool>,
}

impl MockNotifier {
    /// Create a notifier that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent notifications fail (still recorded).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all notified events.
    pub fn events(&self) -> Vec<Event> {
        self.notified
            .lock()
            .expect("MockNotifier mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Get the count of notifications.
    pub fn count(&self) -> usize {
        self.notified
            .lock()
            .expect("MockNotifier mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        self.notified
            .lock()
            .expect("MockNotifier mutex poisoned - a test thread panicked while holding the lock")
            .push(event.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("mock notifier unavailable".into()));
        }
        Ok(())
    }
}
