//! Mock clock for testing.

use crate::application::ports::Clock;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling deterministic
/// testing of the deduplication window. Both the monotonic instant and the
/// wall-clock time move together.
///
/// # Examples
///
/// ```
/// use workflow_logger::infrastructure::mocks::MockClock;
/// use workflow_logger::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
///
/// assert_eq!(clock.now(), start);
///
/// clock.advance(Duration::from_secs(3));
/// assert_eq!(clock.now(), start + Duration::from_secs(3));
/// ```
///
/// # Thread Safety
///
/// `MockClock` can be cloned to share across threads. All clones share the
/// same underlying time, so advancing one clone advances all of them.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<(Instant, DateTime<Utc>)>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    ///
    /// Wall-clock time starts at 2024-01-01T00:00:00Z.
    pub fn new(start: Instant) -> Self {
        let wall = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::with_wall_time(start, wall)
    }

    /// Create a mock clock with an explicit wall-clock starting point.
    pub fn with_wall_time(start: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new((start, wall))),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        time.0 += duration;
        time.1 += chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
    }

    /// Set the monotonic clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        let mut time = self
            .current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        time.0 = instant;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .0
    }

    fn wall_time(&self) -> DateTime<Utc> {
        self.current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .1
    }
}
