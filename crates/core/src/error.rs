//! Processor errors.

/// An error escaping an event handler.
///
/// Any of these is fatal to the event loop: after an unexplained handler
/// failure the single-writer invariant can no longer be assumed, so the
/// loop shuts down and signals its supervisor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    /// A handler observed state it considers impossible.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A handler failed for any other reason.
    #[error("handler failed: {0}")]
    HandlerFailed(String),
}

impl ProcessorError {
    /// Convenience constructor for invariant violations.
    pub fn invariant(message: impl Into<String>) -> Self {
        ProcessorError::InvariantViolation(message.into())
    }

    /// Convenience constructor for generic handler failures.
    pub fn failed(message: impl Into<String>) -> Self {
        ProcessorError::HandlerFailed(message.into())
    }
}
