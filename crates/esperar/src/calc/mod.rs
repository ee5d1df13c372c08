//! Inline calculator widget state machine.
//!
//! A stateful accumulator mirroring a physical calculator's editing
//! affordances: discrete button or keyboard events build an expression
//! buffer, evaluation replaces it with the result. Evaluation failures are
//! fully contained — the buffer shows a transient error indicator and
//! reverts to `"0"` once the reset deadline elapses, never leaving the
//! widget in a broken state longer than the display window.

pub mod expr;

use crate::clock::SharedClock;
use serde::{Deserialize, Serialize};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Buffer contents shown while an evaluation error is displayed
pub const ERROR_INDICATOR: &str = "Error";

/// Default delay before an error indicator reverts to `"0"`
pub const DEFAULT_ERROR_RESET_DELAY_MS: u64 = 1_500;

// =============================================================================
// CONFIG
// =============================================================================

/// Configuration for the calculator widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Delay in milliseconds before an error indicator reverts to `"0"`
    pub error_reset_delay_ms: u64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            error_reset_delay_ms: DEFAULT_ERROR_RESET_DELAY_MS,
        }
    }
}

impl CalculatorConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error reset delay in milliseconds
    #[must_use]
    pub const fn with_error_reset_delay(mut self, delay_ms: u64) -> Self {
        self.error_reset_delay_ms = delay_ms;
        self
    }
}

// =============================================================================
// KEYBOARD CHANNEL
// =============================================================================

/// Keyboard input routed to the calculator surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// A printable key: digit, operator, or decimal point
    Char(char),
    /// Evaluate the buffer
    Enter,
    /// Delete the last character
    Backspace,
    /// Clear the buffer
    Escape,
}

/// Whether a key was consumed or should fall through to default handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The calculator consumed the key
    Handled,
    /// Not a calculator key (or the surface is closed); default browser
    /// handling proceeds
    Ignored,
}

// =============================================================================
// CALCULATOR
// =============================================================================

/// Calculator widget state
#[derive(Debug)]
pub struct Calculator {
    clock: SharedClock,
    config: CalculatorConfig,
    /// Raw expression buffer; never empty, defaults to `"0"`
    current: String,
    /// Snapshot of the buffer at the last successful evaluation
    last_expression: String,
    /// Whether the containing UI surface is open (gates the keyboard)
    open: bool,
    /// Deadline at which a displayed error indicator reverts to `"0"`
    error_reset_at: Option<u64>,
}

impl Calculator {
    /// Create a calculator with the default config
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self::with_config(clock, CalculatorConfig::default())
    }

    /// Create a calculator with an explicit config
    #[must_use]
    pub fn with_config(clock: SharedClock, config: CalculatorConfig) -> Self {
        Self {
            clock,
            config,
            current: "0".to_string(),
            last_expression: String::new(),
            open: false,
            error_reset_at: None,
        }
    }

    /// The current expression buffer
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The expression behind the last successful evaluation, for display;
    /// empty when unset
    #[must_use]
    pub fn last_expression(&self) -> &str {
        &self.last_expression
    }

    /// Whether the error indicator is currently displayed
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_reset_at.is_some()
    }

    /// Whether the containing UI surface is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the containing UI surface, enabling the keyboard channel
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the containing UI surface
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Append a digit, decimal point, or operator glyph to the buffer.
    ///
    /// On a fresh `"0"` buffer a digit replaces the zero outright (no
    /// leading-zero accumulation) while a decimal point appends to it.
    /// Appending while the error indicator is displayed first reverts the
    /// buffer to `"0"`.
    pub fn append(&mut self, token: &str) {
        if self.error_reset_at.is_some() {
            self.reset_buffer();
        }

        if self.current == "0" && !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            self.current = token.to_string();
            return;
        }
        self.current.push_str(token);
    }

    /// Reset the buffer to `"0"` and clear the last expression
    pub fn clear(&mut self) {
        self.reset_buffer();
        self.last_expression.clear();
    }

    /// Remove the last character; a buffer about to empty reverts to `"0"`
    pub fn backspace(&mut self) {
        if self.error_reset_at.is_some() {
            self.reset_buffer();
            return;
        }

        self.current.pop();
        if self.current.is_empty() {
            self.current = "0".to_string();
        }
    }

    /// Evaluate the buffer.
    ///
    /// On success the pre-normalization buffer is snapshotted into the last
    /// expression and the buffer becomes the result's decimal string form.
    /// On failure the buffer shows [`ERROR_INDICATOR`] and a reset deadline
    /// is scheduled; the error never propagates.
    pub fn evaluate(&mut self) {
        let raw = self.current.clone();
        match expr::evaluate(&expr::normalize(&raw)) {
            Ok(value) => {
                self.last_expression = raw;
                self.current = expr::format_result(value);
                self.error_reset_at = None;
                tracing::debug!(
                    expression = %self.last_expression,
                    result = %self.current,
                    "expression evaluated"
                );
            }
            Err(error) => {
                tracing::debug!(%error, expression = %raw, "expression rejected");
                self.current = ERROR_INDICATOR.to_string();
                self.last_expression.clear();
                self.error_reset_at =
                    Some(self.clock.now_ms() + self.config.error_reset_delay_ms);
            }
        }
    }

    /// Revert a due error indicator to `"0"`
    pub fn poll(&mut self) {
        let Some(deadline) = self.error_reset_at else {
            return;
        };
        if self.clock.now_ms() >= deadline {
            self.reset_buffer();
        }
    }

    /// Route a key press; accepted only while the surface is open
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if !self.open {
            return KeyOutcome::Ignored;
        }

        match key {
            Key::Char(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '.' | '%') => {
                let mut buffer = [0u8; 4];
                self.append(c.encode_utf8(&mut buffer));
                KeyOutcome::Handled
            }
            Key::Enter => {
                self.evaluate();
                KeyOutcome::Handled
            }
            Key::Backspace => {
                self.backspace();
                KeyOutcome::Handled
            }
            Key::Escape => {
                self.clear();
                KeyOutcome::Handled
            }
            Key::Char(_) => KeyOutcome::Ignored,
        }
    }

    fn reset_buffer(&mut self) {
        self.current = "0".to_string();
        self.error_reset_at = None;
    }
}
