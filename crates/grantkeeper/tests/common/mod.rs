//! shared fixtures for grantkeeper integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use grantkeeper::{
    Config, GrantLifecycleManager, GrantRecord, GrantStore, InMemoryGrantStore, IssueRequest,
    StoreError,
};
use grantkeeper_types::ManualClock;

/// fixed start instant for manual clocks.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
}

/// build an issuance request.
pub fn request(subject: &str, scope: &str, role: &str, hours: f64) -> IssueRequest {
    IssueRequest {
        subject: subject.to_string(),
        scope: scope.to_string(),
        role: role.to_string(),
        duration_hours: hours,
    }
}

/// manager over `store` with default config and a manual clock at [`start`].
pub fn manual_manager(
    store: Arc<dyn grantkeeper::GrantStoreBoxed>,
) -> (GrantLifecycleManager, ManualClock) {
    let clock = ManualClock::new(start());
    let manager =
        GrantLifecycleManager::new(store, &Config::default()).with_clock(Arc::new(clock.clone()));
    (manager, clock)
}

/// store where another actor always wins the race to delete: the record is
/// removed, but the caller is told it was not found.
#[derive(Clone, Default)]
pub struct RacingDeleteStore {
    pub inner: InMemoryGrantStore,
}

impl GrantStore for RacingDeleteStore {
    fn create_grant(&self, record: GrantRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.inner.create_grant(record)
    }

    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        self.inner.list_scopes()
    }

    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>, StoreError>> + Send {
        self.inner.list_owned_grants(label_key, label_value)
    }

    fn delete_grant(
        &self,
        scope: String,
        record_name: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            // the concurrent deleter gets there first
            let _ = self.inner.delete_grant(scope.clone(), record_name.clone()).await;
            self.inner.delete_grant(scope, record_name).await
        }
    }
}

/// store whose deletes fail for selected record names.
#[derive(Clone, Default)]
pub struct FailingDeleteStore {
    pub inner: InMemoryGrantStore,
    pub failing: HashSet<String>,
}

impl FailingDeleteStore {
    pub fn failing_for<I: IntoIterator<Item = &'static str>>(names: I) -> Self {
        Self {
            inner: InMemoryGrantStore::new(),
            failing: names.into_iter().map(str::to_string).collect(),
        }
    }
}

impl GrantStore for FailingDeleteStore {
    fn create_grant(&self, record: GrantRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.inner.create_grant(record)
    }

    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        self.inner.list_scopes()
    }

    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>, StoreError>> + Send {
        self.inner.list_owned_grants(label_key, label_value)
    }

    fn delete_grant(
        &self,
        scope: String,
        record_name: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            if self.failing.contains(&record_name) {
                return Err(StoreError::Timeout(format!("delete {scope}/{record_name}")));
            }
            self.inner.delete_grant(scope, record_name).await
        }
    }
}

/// store whose control plane never answers in time. records a call per
/// operation and writes nothing.
#[derive(Clone, Default)]
pub struct TimeoutStore {
    pub inner: InMemoryGrantStore,
    calls: Arc<AtomicUsize>,
}

impl TimeoutStore {
    /// store calls attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn timeout(&self, op: &str) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::Timeout(format!("{op}: deadline exceeded"))
    }
}

impl GrantStore for TimeoutStore {
    fn create_grant(&self, _record: GrantRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        let err = self.timeout("create");
        async move { Err(err) }
    }

    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        let err = self.timeout("list scopes");
        async move { Err(err) }
    }

    fn list_owned_grants(
        &self,
        _label_key: String,
        _label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>, StoreError>> + Send {
        let err = self.timeout("list grants");
        async move { Err(err) }
    }

    fn delete_grant(
        &self,
        _scope: String,
        _record_name: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let err = self.timeout("delete");
        async move { Err(err) }
    }
}

/// store that holds every owned-grant listing open for `delay` and records
/// the peak number of listings in flight at once.
#[derive(Default)]
pub struct SlowListingStore {
    pub inner: InMemoryGrantStore,
    pub delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl SlowListingStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// highest number of concurrent listings observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// listings currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// listings started so far.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl GrantStore for SlowListingStore {
    fn create_grant(&self, record: GrantRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.inner.create_grant(record)
    }

    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        self.inner.list_scopes()
    }

    fn list_owned_grants(
        &self,
        label_key: String,
        label_value: String,
    ) -> impl Future<Output = Result<Vec<GrantRecord>, StoreError>> + Send {
        async move {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let result = self.inner.list_owned_grants(label_key, label_value).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn delete_grant(
        &self,
        scope: String,
        record_name: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.inner.delete_grant(scope, record_name)
    }
}

/// poll `check` until it holds or `limit` elapses.
pub async fn wait_for<F: FnMut() -> bool>(limit: Duration, mut check: F) -> bool {
    tokio::time::timeout(limit, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
