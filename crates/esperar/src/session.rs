//! Page-session context object.
//!
//! One [`PageSession`] owns the clock, the activity tracker, and the
//! calculator for the lifetime of a page. The host's event-binding layer
//! feeds it typed [`PageSignal`]s and key presses, and calls [`poll`] from
//! its scheduler tick so stored deadlines can fire. Explicit construction
//! (instead of ambient globals) is what makes the whole state machine
//! testable without a page environment.
//!
//! [`poll`]: PageSession::poll

use crate::calc::{Calculator, CalculatorConfig, Key, KeyOutcome};
use crate::clock::{PageClock, SharedClock};
use crate::signal::PageSignal;
use crate::tracker::{ActivityTracker, TrackerConfig, TrackerHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for a page session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Activity tracker configuration
    pub tracker: TrackerConfig,
    /// Calculator configuration
    pub calculator: CalculatorConfig,
}

/// Context object owning the page's presentation state machines
#[derive(Debug)]
pub struct PageSession {
    clock: SharedClock,
    tracker: TrackerHandle,
    calculator: Calculator,
}

impl PageSession {
    /// Create a session on the system clock with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(PageClock::system(), SessionConfig::default())
    }

    /// Create a session on the system clock with an explicit configuration
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_clock(PageClock::system(), config)
    }

    /// Create a session on an explicit clock
    #[must_use]
    pub fn with_clock(clock: SharedClock, config: SessionConfig) -> Self {
        let tracker =
            ActivityTracker::with_config(Arc::clone(&clock), config.tracker).into_handle();
        let calculator = Calculator::with_config(Arc::clone(&clock), config.calculator);
        Self {
            clock,
            tracker,
            calculator,
        }
    }

    /// The session clock
    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// A cloneable tracker handle, for the transport middleware and for
    /// page scripts that bracket operations manually
    #[must_use]
    pub fn tracker(&self) -> TrackerHandle {
        self.tracker.clone()
    }

    /// The calculator widget
    #[must_use]
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Mutable access to the calculator widget, for button bindings
    pub fn calculator_mut(&mut self) -> &mut Calculator {
        &mut self.calculator
    }

    /// Dispatch a browser signal to the tracker
    pub fn handle_signal(&mut self, signal: &PageSignal) {
        tracing::trace!(?signal, "page signal");
        match signal {
            PageSignal::Click(target) => {
                if target.starts_operation() {
                    self.tracker.operation_started();
                }
            }
            PageSignal::FormSubmit => self.tracker.operation_started(),
            PageSignal::BeforeUnload => self.tracker.begin_navigation(),
            PageSignal::Loaded => self.tracker.reset(),
            PageSignal::PageShow { persisted } => {
                if *persisted {
                    self.tracker.reset();
                }
            }
            PageSignal::VisibilityChanged { visible } => {
                // Visible again with the navigation flag still up means the
                // user cancelled the navigation; no end signal will arrive
                if *visible && self.tracker.is_navigating_away() {
                    self.tracker.reset();
                }
            }
        }
    }

    /// Route a key press to the calculator
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        self.calculator.handle_key(key)
    }

    /// Let stored deadlines fire on both components
    pub fn poll(&mut self) {
        self.tracker.poll();
        self.calculator.poll();
    }
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new()
    }
}
