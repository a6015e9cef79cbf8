//! grantkeeper - short-lived, scoped role grants with automatic revocation.
//!
//! this crate provides the grant lifecycle and its background loop:
//! - [`lifecycle`]: issuance, eligible-scope listing and reconciliation sweeps
//! - [`scheduler`]: fixed-interval, non-overlapping reconciliation
//! - [`logging`]: tracing subscriber setup
//!
//! the control plane holding grant records is reached only through the
//! [`grantkeeper_store::GrantStore`] capability, injected at construction.

#![warn(missing_docs)]

mod error;
/// grant issuance and reconciliation.
pub mod lifecycle;
/// tracing subscriber setup.
pub mod logging;
/// background reconciliation loop.
pub mod scheduler;

pub use error::{FailureCause, IssueError, ListError, LoggingError};
pub use lifecycle::{
    GrantFailure, GrantLifecycleManager, IssueRequest, IssuedGrant, ReconcileReport,
};
pub use scheduler::{ReconciliationScheduler, SchedulerHandle};

pub use grantkeeper_store::{GrantStore, GrantStoreBoxed, InMemoryGrantStore, StoreError};
pub use grantkeeper_types::{Clock, Config, GrantId, GrantRecord, GrantState, Role, SystemClock};
