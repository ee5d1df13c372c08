//! Operation-activity tracking for the blocking loading overlay.
//!
//! The tracker counts in-flight "long" operations (navigation, submission,
//! network requests) and shows the overlay only for operations that outlive a
//! grace period, so sub-second interactions never flash a loading state. A
//! counter rather than a boolean keeps the overlay up until the *last*
//! overlapping operation finishes. The show-timer is a stored deadline fired
//! by [`ActivityTracker::poll`], which re-checks the counter at fire time:
//! a deadline scheduled while work was in flight never shows the overlay
//! after that work has already drained.

use crate::clock::SharedClock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default grace period before an in-flight operation surfaces the overlay
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 1_000;

// =============================================================================
// CONFIG
// =============================================================================

/// Configuration for the activity tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Grace period in milliseconds before the overlay shows
    pub grace_period_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
        }
    }
}

impl TrackerConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period in milliseconds
    #[must_use]
    pub const fn with_grace_period(mut self, grace_period_ms: u64) -> Self {
        self.grace_period_ms = grace_period_ms;
        self
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// Counts in-flight operations and drives overlay visibility
#[derive(Debug)]
pub struct ActivityTracker {
    config: TrackerConfig,
    clock: SharedClock,
    /// Number of operations currently in flight
    active: u32,
    /// Whether the blocking overlay is shown
    overlay_visible: bool,
    /// Deadline at which the overlay shows if work is still in flight.
    /// Replaced wholesale on every start, so at most one deadline can fire.
    pending_show: Option<u64>,
    /// Set between a "leaving page" signal and either actual navigation or
    /// the page regaining visibility
    navigating_away: bool,
}

impl ActivityTracker {
    /// Create a tracker with the default grace period
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self::with_config(clock, TrackerConfig::default())
    }

    /// Create a tracker with an explicit config
    #[must_use]
    pub fn with_config(clock: SharedClock, config: TrackerConfig) -> Self {
        Self {
            config,
            clock,
            active: 0,
            overlay_visible: false,
            pending_show: None,
            navigating_away: false,
        }
    }

    /// Number of operations currently in flight
    #[must_use]
    pub fn active_operations(&self) -> u32 {
        self.active
    }

    /// Whether the blocking overlay is currently shown
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Whether a "leaving page" signal is pending resolution
    #[must_use]
    pub fn is_navigating_away(&self) -> bool {
        self.navigating_away
    }

    /// Deadline of the pending show-timer, if one is scheduled
    #[must_use]
    pub fn pending_show_at(&self) -> Option<u64> {
        self.pending_show
    }

    /// The tracker's configuration
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Record the start of an operation.
    ///
    /// Increments the counter and replaces any pending show deadline with a
    /// fresh one at `now + grace_period`.
    pub fn operation_started(&mut self) {
        self.active = self.active.saturating_add(1);
        self.pending_show = Some(self.clock.now_ms() + self.config.grace_period_ms);
        tracing::debug!(active = self.active, "operation started");
    }

    /// Record the end of an operation.
    ///
    /// Ends without a matching counted start clamp at zero, silently. At
    /// zero the overlay hides immediately and the pending deadline is
    /// dropped.
    pub fn operation_ended(&mut self) {
        self.active = self.active.saturating_sub(1);
        tracing::debug!(active = self.active, "operation ended");
        if self.active == 0 {
            self.hide_loading();
        }
    }

    /// Record an outgoing-navigation signal.
    ///
    /// Only raises the flag; the counter is left to the other signals so a
    /// tracked click followed by unload is not double-counted.
    pub fn begin_navigation(&mut self) {
        self.navigating_away = true;
        tracing::debug!("navigating away");
    }

    /// Force-clear the whole loading state.
    ///
    /// Recovery hook for bfcache restoration and cancelled navigations,
    /// where counters from a previous page instance are stale and no "end"
    /// signal will ever arrive for them.
    pub fn reset(&mut self) {
        self.active = 0;
        self.navigating_away = false;
        self.hide_loading();
        tracing::debug!("loading state reset");
    }

    /// Show the overlay immediately, bypassing the grace period.
    ///
    /// Manual bracket for operations the automatic interceptors cannot see.
    pub fn show_loading(&mut self) {
        if !self.overlay_visible {
            self.overlay_visible = true;
            tracing::debug!("overlay shown");
        }
    }

    /// Hide the overlay and drop any pending show deadline
    pub fn hide_loading(&mut self) {
        if self.overlay_visible {
            tracing::debug!("overlay hidden");
        }
        self.overlay_visible = false;
        self.pending_show = None;
    }

    /// Fire a due show deadline.
    ///
    /// The counter and the navigation flag are re-checked here, at fire
    /// time, never trusted from scheduling time.
    pub fn poll(&mut self) {
        let Some(deadline) = self.pending_show else {
            return;
        };
        if self.clock.now_ms() < deadline {
            return;
        }

        self.pending_show = None;
        if self.active > 0 && !self.navigating_away {
            self.show_loading();
        }
    }

    /// Wrap this tracker in a cloneable [`TrackerHandle`]
    #[must_use]
    pub fn into_handle(self) -> TrackerHandle {
        TrackerHandle {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

// =============================================================================
// SHARED HANDLE
// =============================================================================

/// Cloneable tracker handle for manual bracketing and the transport
/// middleware.
///
/// Bookkeeping through the handle never panics: a poisoned lock is absorbed,
/// not propagated.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    inner: Arc<Mutex<ActivityTracker>>,
}

impl TrackerHandle {
    /// Create a handle owning a fresh tracker
    #[must_use]
    pub fn new(tracker: ActivityTracker) -> Self {
        tracker.into_handle()
    }

    fn lock(&self) -> MutexGuard<'_, ActivityTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the start of an operation
    pub fn operation_started(&self) {
        self.lock().operation_started();
    }

    /// Record the end of an operation
    pub fn operation_ended(&self) {
        self.lock().operation_ended();
    }

    /// Show the overlay immediately
    pub fn show_loading(&self) {
        self.lock().show_loading();
    }

    /// Hide the overlay
    pub fn hide_loading(&self) {
        self.lock().hide_loading();
    }

    /// Record an outgoing-navigation signal
    pub fn begin_navigation(&self) {
        self.lock().begin_navigation();
    }

    /// Force-clear the whole loading state
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Fire a due show deadline
    pub fn poll(&self) {
        self.lock().poll();
    }

    /// Number of operations currently in flight
    #[must_use]
    pub fn active_operations(&self) -> u32 {
        self.lock().active_operations()
    }

    /// Whether the blocking overlay is currently shown
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.lock().overlay_visible()
    }

    /// Whether a "leaving page" signal is pending resolution
    #[must_use]
    pub fn is_navigating_away(&self) -> bool {
        self.lock().is_navigating_away()
    }

    /// Deadline of the pending show-timer, if one is scheduled
    #[must_use]
    pub fn pending_show_at(&self) -> Option<u64> {
        self.lock().pending_show_at()
    }
}

// =============================================================================
// RAII BRACKET
// =============================================================================

/// Brackets one operation: started on construction, ended on drop.
///
/// The drop runs on success and failure paths alike, which is what keeps a
/// failed request from leaving the counter stuck above zero.
#[derive(Debug)]
pub struct OperationGuard {
    tracker: TrackerHandle,
}

impl OperationGuard {
    /// Start an operation that ends when the guard drops
    #[must_use]
    pub fn begin(tracker: TrackerHandle) -> Self {
        tracker.operation_started();
        Self { tracker }
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.tracker.operation_ended();
    }
}
