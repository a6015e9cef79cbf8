//! error types for grantkeeper.

use grantkeeper_store::StoreError;
use thiserror::Error;

/// why a grant could not be issued.
///
/// every variant except [`IssueError::StoreUnavailable`] is a caller-input
/// error and is never worth retrying.
#[derive(Debug, Error)]
pub enum IssueError {
    /// duration is zero, negative, not finite, or too large to represent.
    #[error("invalid duration: {0} hours (must be a positive, finite number)")]
    InvalidDuration(f64),

    /// role is unknown or not allowed for issuance.
    #[error("invalid role: {0:?}")]
    InvalidRole(String),

    /// scope is excluded from issuance by policy.
    #[error("access to scope {0:?} is restricted")]
    RestrictedScope(String),

    /// subject is empty.
    #[error("subject cannot be empty")]
    InvalidSubject,

    /// scope is empty.
    #[error("scope cannot be empty")]
    InvalidScope,

    /// the store failed or timed out while persisting the grant.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

impl IssueError {
    /// whether the caller supplied bad input (as opposed to a store failure).
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, IssueError::StoreUnavailable(_))
    }
}

/// a listing against the store failed outright.
#[derive(Debug, Error)]
pub enum ListError {
    /// the store failed or timed out while listing.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// why a single grant was not revoked during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// expiry annotation missing or unparseable. left for manual repair.
    #[error("unusable expiry: {0}")]
    Expiry(#[source] grantkeeper_types::Error),

    /// the store refused or failed the deletion.
    #[error("delete failed: {0}")]
    Delete(#[source] StoreError),
}

/// failed to install the global tracing subscriber.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(#[from] tracing::subscriber::SetGlobalDefaultError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(IssueError::InvalidDuration(0.0).is_caller_error());
        assert!(IssueError::RestrictedScope("x-prod".into()).is_caller_error());
        assert!(
            !IssueError::StoreUnavailable(StoreError::Timeout("5s".into())).is_caller_error()
        );
    }

    #[test]
    fn test_store_unavailable_keeps_source() {
        use std::error::Error as _;

        let err = IssueError::StoreUnavailable(StoreError::Unavailable("conn refused".into()));
        assert!(err.to_string().contains("conn refused"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            IssueError::RestrictedScope("team-b-prod".into()).to_string(),
            "access to scope \"team-b-prod\" is restricted"
        );
        assert_eq!(
            IssueError::InvalidRole("admin".into()).to_string(),
            "invalid role: \"admin\""
        );
    }
}
