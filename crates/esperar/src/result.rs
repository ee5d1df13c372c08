//! Result and error types for Esperar.

use thiserror::Error;

/// Result type for Esperar operations
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Errors that can occur in Esperar
#[derive(Debug, Error)]
pub enum EsperarError {
    /// Expression did not parse as arithmetic
    #[error("Malformed expression: {message}")]
    MalformedExpression {
        /// What the tokenizer or parser rejected
        message: String,
    },

    /// Evaluation produced infinity or NaN
    #[error("Expression result is not a finite number")]
    NonFiniteResult,

    /// Underlying transport failure, passed through unchanged after
    /// bookkeeping
    #[error("Transport error: {message}")]
    Transport {
        /// Error message from the transport
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EsperarError {
    /// Create a transport error from any message
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// True for the two evaluation-failure kinds the calculator contains
    /// locally
    #[must_use]
    pub const fn is_evaluation_error(&self) -> bool {
        matches!(self, Self::MalformedExpression { .. } | Self::NonFiniteResult)
    }
}
