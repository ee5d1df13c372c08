//! Esperar: operation-activity tracking and widget state machines for
//! server-rendered web UIs.
//!
//! The hard core of a server-rendered application's client side, lifted out
//! of ambient page globals into explicit, testable state machines: an
//! activity tracker that surfaces a blocking loading overlay only for
//! operations outliving a grace period, and an inline calculator widget
//! with a real expression evaluator instead of dynamic code execution.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ESPERAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  clicks / submits / lifecycle ──► PageSignal ──► PageSession     │
//! │                                                   │         │    │
//! │  requests ──► TrackedTransport ──► ActivityTracker│  Calculator  │
//! │                (silent-header exempt)     │       │       │      │
//! │                                           └── PageClock ──┘      │
//! │                                        (deadlines fired by poll) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deferred work (grace-period expiry, error-indicator reset) is stored as
//! clock deadlines and fired by [`PageSession::poll`], so a stale deadline
//! always re-checks current state instead of trusting the state captured at
//! scheduling time.

#![warn(missing_docs)]

pub mod calc;
pub mod clock;
pub mod filter;
pub mod net;
pub mod result;
pub mod session;
pub mod signal;
pub mod theme;
pub mod tracker;

pub use calc::{
    Calculator, CalculatorConfig, Key, KeyOutcome, DEFAULT_ERROR_RESET_DELAY_MS, ERROR_INDICATOR,
};
pub use clock::{PageClock, SharedClock};
pub use filter::{filter_rows, row_matches, FilterOutcome};
pub use net::{
    HttpMethod, MockTransport, Request, RequestLifecycle, Response, TrackedTransport, Transport,
    SILENT_REQUEST_HEADER,
};
pub use result::{EsperarError, EsperarResult};
pub use session::{PageSession, SessionConfig};
pub use signal::{ClickTarget, PageSignal, ToggleAttr};
pub use theme::{MemoryStore, PreferenceStore, Theme, ThemeManager, THEME_KEY};
pub use tracker::{
    ActivityTracker, OperationGuard, TrackerConfig, TrackerHandle, DEFAULT_GRACE_PERIOD_MS,
};
