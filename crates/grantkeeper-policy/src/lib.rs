//! issuance-time policy for grantkeeper.
//!
//! two pure building blocks used by the lifecycle manager:
//! - [`ScopePolicy`]: which scopes may receive grants at all
//! - [`GrantIdentity`]: identifier minting and record-name derivation

#![warn(missing_docs)]

pub mod identity;
pub mod scope;

pub use identity::GrantIdentity;
pub use scope::ScopePolicy;
