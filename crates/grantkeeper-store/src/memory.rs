//! in-memory grant store.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use grantkeeper_types::GrantRecord;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StoreError;
use crate::{GrantStore, Result};

#[derive(Debug, Default)]
struct Inner {
    scopes: Vec<String>,
    /// keyed by (scope, record name).
    grants: BTreeMap<(String, String), GrantRecord>,
}

/// a [`GrantStore`] backed by process memory.
///
/// clones share the same contents. every operation is atomic per record,
/// which is all the lifecycle manager relies on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrantStore {
    inner: Arc<RwLock<Inner>>,
    unavailable: Arc<AtomicBool>,
    create_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl InMemoryGrantStore {
    /// create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// create a store pre-populated with scope names.
    pub fn with_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inner = Inner {
            scopes: scopes.into_iter().map(Into::into).collect(),
            grants: BTreeMap::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            ..Self::default()
        }
    }

    /// add a scope name if not already present.
    pub async fn add_scope(&self, scope: impl Into<String>) {
        let scope = scope.into();
        let mut inner = self.inner.write().await;
        if !inner.scopes.contains(&scope) {
            inner.scopes.push(scope);
        }
    }

    /// insert a record as-is, bypassing every check and counter.
    ///
    /// used to seed foreign, expired or corrupt records.
    pub async fn insert_raw(&self, record: GrantRecord) {
        let key = (record.scope.clone(), record.name.clone());
        self.inner.write().await.grants.insert(key, record);
    }

    /// fetch a record by scope and name.
    pub async fn get(&self, scope: &str, name: &str) -> Option<GrantRecord> {
        self.inner
            .read()
            .await
            .grants
            .get(&(scope.to_string(), name.to_string()))
            .cloned()
    }

    /// number of records across all scopes.
    pub async fn len(&self) -> usize {
        self.inner.read().await.grants.len()
    }

    /// whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// how many times `create_grant` has been called.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// how many times `delete_grant` has been called.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl GrantStore for InMemoryGrantStore {
    fn create_grant(&self, record: GrantRecord) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            trace!(scope = %record.scope, name = %record.name, "storing grant record");
            let key = (record.scope.clone(), record.name.clone());
            self.inner.write().await.grants.insert(key, record);
            Ok(())
        }
    }

    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move {
            self.check_available()?;
            Ok(self.inner.read().await.scopes.clone())
        }
    }

    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>>> + Send {
        async move {
            self.check_available()?;
            let inner = self.inner.read().await;
            Ok(inner
                .grants
                .values()
                .filter(|g| g.is_owned_by(&label_key, &label_value))
                .cloned()
                .collect())
        }
    }

    fn delete_grant(
        &self,
        scope: String,
        record_name: String,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            let key = (scope, record_name);
            match self.inner.write().await.grants.remove(&key) {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(format!("{}/{}", key.0, key.1))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantkeeper_types::test_utils::TestGrantBuilder;

    #[tokio::test]
    async fn test_create_and_list_owned() {
        let store = InMemoryGrantStore::new();
        store
            .create_grant(TestGrantBuilder::new("alice").build())
            .await
            .unwrap();
        store
            .insert_raw(TestGrantBuilder::new("mallory").unowned().build())
            .await;

        let owned = store
            .list_owned_grants("created-by".into(), "rbac-tool".into())
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].subject, "alice");
        assert_eq!(store.len().await, 2);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_same_name_last_write_wins() {
        let store = InMemoryGrantStore::new();
        let first = TestGrantBuilder::new("alice").build();
        let second = TestGrantBuilder::new("alice")
            .with_role(grantkeeper_types::Role::Edit)
            .build();

        store.create_grant(first).await.unwrap();
        store.create_grant(second.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("team-a", "rbactool-alice").await, Some(second));
    }

    #[tokio::test]
    async fn test_same_name_in_different_scopes() {
        let store = InMemoryGrantStore::new();
        store
            .create_grant(TestGrantBuilder::new("alice").with_scope("team-a").build())
            .await
            .unwrap();
        store
            .create_grant(TestGrantBuilder::new("alice").with_scope("team-b").build())
            .await
            .unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryGrantStore::new();
        let err = store
            .delete_grant("team-a".into(), "rbactool-ghost".into())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let store = InMemoryGrantStore::new();
        store
            .create_grant(TestGrantBuilder::new("alice").build())
            .await
            .unwrap();
        store
            .delete_grant("team-a".into(), "rbactool-alice".into())
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_scopes_keep_order() {
        let store = InMemoryGrantStore::with_scopes(["team-a", "team-b-prod"]);
        store.add_scope("shared").await;
        store.add_scope("team-a").await;
        assert_eq!(
            store.list_scopes().await.unwrap(),
            vec!["team-a", "team-b-prod", "shared"]
        );
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = InMemoryGrantStore::with_scopes(["team-a"]);
        store.set_unavailable(true);

        assert!(matches!(
            store.list_scopes().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.create_grant(TestGrantBuilder::new("a").build()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store
                .list_owned_grants("created-by".into(), "rbac-tool".into())
                .await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert!(store.list_scopes().await.is_ok());
    }

    #[tokio::test]
    async fn test_boxed_dispatch() {
        let store: Arc<dyn crate::GrantStoreBoxed> = Arc::new(InMemoryGrantStore::new());
        store
            .create_grant(TestGrantBuilder::new("alice").build())
            .await
            .unwrap();
        let owned = store
            .list_owned_grants("created-by".into(), "rbac-tool".into())
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
    }
}
