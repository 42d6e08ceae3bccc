use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Hands out strictly increasing modification times.
///
/// Real edits within one test can land in the same filesystem timestamp
/// tick; stamping every write from this clock keeps "newer" unambiguous.
#[derive(Clone)]
pub struct FileClock {
    current: Arc<AtomicU64>,
}

impl FileClock {
    /// Start at a fixed whole-second instant.
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(1_700_000_000)),
        }
    }

    /// Current time without advancing
    pub fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.current.load(Ordering::SeqCst))
    }

    /// Advance by one second and return the new time
    pub fn next(&self) -> SystemTime {
        let secs = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Advance time by days
    pub fn advance_days(&self, days: u64) {
        self.current.fetch_add(days * 86400, Ordering::SeqCst);
    }
}

impl Default for FileClock {
    fn default() -> Self {
        Self::new()
    }
}
