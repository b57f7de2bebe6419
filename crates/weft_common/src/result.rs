//! The error raised when weft itself is at fault.

/// An internal error: some bookkeeping invariant of the engine was violated.
///
/// Problems in the user's hierarchy (bad connections, missing writers, illegal
/// port directions) are domain errors with their own types.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
