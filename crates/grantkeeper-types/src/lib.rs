//! core types for grantkeeper - time-bounded role grants over a multi-tenant pool.
//!
//! this crate provides the data structures shared by every other crate:
//! - [`GrantRecord`]: the persisted shape of a grant
//! - [`GrantId`]: time-ordered grant identifiers
//! - [`Role`]: the closed set of grantable roles
//! - [`Clock`]: injectable time source
//! - [`Config`]: application configuration

#![warn(missing_docs)]

mod clock;
mod config;
mod error;
mod grant;
mod grant_id;
mod role;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, IssuanceConfig, OwnershipConfig, ReconcileConfig, ScopePolicyConfig};
pub use error::Error;
pub use grant::{
    ANNOTATION_EXPIRY, ANNOTATION_IDENTIFIER, GrantRecord, GrantState, format_expiry,
    parse_expiry,
};
pub use grant_id::GrantId;
pub use role::Role;

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
