//! grant store capability for grantkeeper.
//!
//! the lifecycle manager never talks to a control plane directly. it consumes
//! the [`GrantStore`] capability defined here:
//! - create a grant record
//! - list scope names
//! - list grants carrying an ownership label
//! - delete a grant by scope and record name
//!
//! [`InMemoryGrantStore`] is a complete implementation of the contract, used by
//! tests and by embedders that have no external control plane.

#![warn(missing_docs)]

mod error;
mod memory;

pub use error::StoreError;
pub use memory::InMemoryGrantStore;

use std::future::Future;
use std::pin::Pin;

use grantkeeper_types::GrantRecord;

/// result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// capability interface over the control plane holding grant records.
///
/// implementations are expected to bound every call by their own timeout and
/// report it as [`StoreError::Timeout`]; the core adds no deadline of its own.
/// takes owned strings to avoid lifetime issues with dynamic dispatch.
pub trait GrantStore: Send + Sync {
    /// persist a grant record. an existing record with the same scope and
    /// name is replaced (last write wins).
    fn create_grant(&self, record: GrantRecord) -> impl Future<Output = Result<()>> + Send;

    /// list every scope name, in the store's order.
    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// list grants whose labels contain `key=value`, across all scopes.
    /// no ordering guarantee.
    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>>> + Send;

    /// delete a grant. returns [`StoreError::NotFound`] if it is already gone.
    fn delete_grant(
        &self,
        scope: String,
        record_name: String,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// boxed future returned by [`GrantStoreBoxed`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// object-safe wrapper for [`GrantStore`], used for dynamic dispatch
pub trait GrantStoreBoxed: Send + Sync {
    /// create a grant record
    fn create_grant(&self, record: GrantRecord) -> BoxFuture<'_, Result<()>>;

    /// list scope names
    fn list_scopes(&self) -> BoxFuture<'_, Result<Vec<String>>>;

    /// list grants carrying a label
    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> BoxFuture<'_, Result<Vec<GrantRecord>>>;

    /// delete a grant
    fn delete_grant(&self, scope: String, record_name: String) -> BoxFuture<'_, Result<()>>;
}

impl<T: GrantStore> GrantStoreBoxed for T {
    fn create_grant(&self, record: GrantRecord) -> BoxFuture<'_, Result<()>> {
        Box::pin(GrantStore::create_grant(self, record))
    }

    fn list_scopes(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        Box::pin(GrantStore::list_scopes(self))
    }

    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> BoxFuture<'_, Result<Vec<GrantRecord>>> {
        Box::pin(GrantStore::list_owned_grants(self, label_key, label_value))
    }

    fn delete_grant(&self, scope: String, record_name: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(GrantStore::delete_grant(self, scope, record_name))
    }
}
