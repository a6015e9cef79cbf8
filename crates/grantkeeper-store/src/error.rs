//! store error types.

use thiserror::Error;

/// errors returned by a [`crate::GrantStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// the addressed record or scope does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// the control plane could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// the control plane did not answer within its own deadline.
    #[error("store timed out: {0}")]
    Timeout(String),

    /// the control plane refused the request (validation, quota, conflict).
    #[error("store rejected request: {0}")]
    Rejected(String),
}

impl StoreError {
    /// whether this is a not-found result.
    ///
    /// deletion treats not-found as success, so callers check this before
    /// counting a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
