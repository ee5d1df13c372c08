//! Millisecond clock backing all deferred work in a page session.
//!
//! Deferred callbacks in this crate (grace-period expiry, error-indicator
//! reset) are stored as deadlines and re-checked against this clock when the
//! host event loop polls, so a stale deadline always observes current state
//! rather than the state captured at scheduling time. Production sessions use
//! a system-backed clock; tests drive a manual one deterministically.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared clock handle
pub type SharedClock = Arc<PageClock>;

/// Millisecond clock, system-backed or manually driven
#[derive(Debug)]
pub struct PageClock {
    /// Current manual time; meaningful only when `manual` is set
    manual_ms: AtomicU64,
    /// Whether the clock is manually driven
    manual: AtomicBool,
}

impl PageClock {
    /// Create a system-backed clock
    #[must_use]
    pub fn system() -> SharedClock {
        Arc::new(Self {
            manual_ms: AtomicU64::new(0),
            manual: AtomicBool::new(false),
        })
    }

    /// Create a manually driven clock starting at `start_ms`
    #[must_use]
    pub fn manual(start_ms: u64) -> SharedClock {
        Arc::new(Self {
            manual_ms: AtomicU64::new(start_ms),
            manual: AtomicBool::new(true),
        })
    }

    /// Whether this clock is manually driven
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.manual.load(Ordering::SeqCst)
    }

    /// Current time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        if self.is_manual() {
            return self.manual_ms.load(Ordering::SeqCst);
        }

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Advance a manual clock by `delta_ms`; no-op on a system clock
    pub fn advance_ms(&self, delta_ms: u64) {
        if self.is_manual() {
            self.manual_ms.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_given_time() {
        let clock = PageClock::manual(1_000);
        assert!(clock.is_manual());
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = PageClock::manual(0);
        clock.advance_ms(250);
        clock.advance_ms(750);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn test_system_clock_tracks_real_time() {
        let clock = PageClock::system();
        assert!(!clock.is_manual());

        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let clock_now = clock.now_ms();

        assert!(clock_now.abs_diff(system_now) < 1_000);
    }

    #[test]
    fn test_advance_is_noop_on_system_clock() {
        let clock = PageClock::system();
        let before = clock.now_ms();
        clock.advance_ms(60_000);
        // Still within real time, not jumped a minute ahead
        assert!(clock.now_ms() < before + 1_000);
    }

    #[test]
    fn test_shared_handle_observes_advance() {
        let clock = PageClock::manual(0);
        let other = Arc::clone(&clock);
        clock.advance_ms(42);
        assert_eq!(other.now_ms(), 42);
    }
}
