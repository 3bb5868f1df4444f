//! Storage error types.
//!
//! These are the failures of a remote call itself. Names the store could not
//! resolve are not errors at this layer; they come back in-band on
//! [`FetchResult`](crate::FetchResult) and [`DeleteResult`](crate::DeleteResult).

use thiserror::Error;

/// Errors returned by a [`ParameterStore`](crate::ParameterStore) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The service could not be reached.
    #[error("connection error: {message}")]
    ConnectionError { message: String },

    /// The service rejected the call because of rate limits.
    #[error("request throttled: {message}")]
    Throttled { message: String },

    /// The caller lacks permission for the call.
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// Write without overwrite targeted an existing parameter.
    #[error("parameter already exists: {name}")]
    ParameterAlreadyExists { name: String },

    /// The request itself was malformed (bad name, too many names).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The service returned an error not covered above.
    #[error("service error: {message}")]
    ServiceError { message: String },

    /// The caller cancelled the call.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A single call ran longer than its own timeout.
    #[error("call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Internal error.
    #[error("internal storage error: {message}")]
    InternalError { message: String },
}

impl StorageError {
    /// Returns true if the call was interrupted by the caller rather than
    /// failed by the service. A per-call [`Timeout`](Self::Timeout) is a
    /// failure of that call only.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, StorageError::Cancelled | StorageError::DeadlineExceeded)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_caller_interruptions_are_interrupted() {
        assert!(StorageError::Cancelled.is_interrupted());
        assert!(StorageError::DeadlineExceeded.is_interrupted());
        assert!(!StorageError::Timeout { timeout_ms: 500 }.is_interrupted());
        assert_eq!(
            StorageError::Timeout { timeout_ms: 500 }.to_string(),
            "call timed out after 500ms"
        );
    }
}
