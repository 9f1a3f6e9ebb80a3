//! Error types for the MOKP engine.
//!
//! Every fallible operation reports a [`MokpError`] synchronously at the
//! call that detects the problem. Nothing is retried internally.

use crate::engine::SolverState;
use thiserror::Error;

/// Main error type for MOKP operations.
#[derive(Debug, Error)]
pub enum MokpError {
    /// A parameter is out of range, unknown, or the problem dimensions are
    /// unsupported.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The operation needs a loaded problem but none is loaded.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// The operation is not permitted in the current solver state.
    #[error("invalid state: `{operation}` is not allowed while {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the session was in.
        state: SolverState,
    },

    /// An allocation failed while growing the population or archive.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// Problem or solution data violates shape, sign, or format rules.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// I/O failure while loading a problem or persisting results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result records could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::collections::TryReserveError> for MokpError {
    fn from(e: std::collections::TryReserveError) -> Self {
        MokpError::ResourceExhaustion(e.to_string())
    }
}

/// Result type alias for MOKP operations.
pub type Result<T> = std::result::Result<T, MokpError>;
