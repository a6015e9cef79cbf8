//! the access grant lifecycle manager.
//!
//! issues time-bounded grants, lists the scopes grants may be issued into,
//! and revokes expired grants in reconciliation sweeps. the store is the only
//! source of truth: the manager keeps no cache, so every call reads or writes
//! the store directly.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use grantkeeper_policy::{GrantIdentity, ScopePolicy};
use grantkeeper_store::GrantStoreBoxed;
use grantkeeper_types::{
    Clock, Config, GrantId, GrantRecord, GrantState, OwnershipConfig, Role, SystemClock,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FailureCause, IssueError, ListError};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// an issuance request from the (external) request-handling layer.
///
/// the caller's identity must already be verified before this reaches
/// [`GrantLifecycleManager::issue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// principal receiving access.
    pub subject: String,
    /// scope the grant applies to.
    pub scope: String,
    /// requested role, e.g. `view` or `edit`.
    pub role: String,
    /// lifetime in hours. fractional values are allowed.
    pub duration_hours: f64,
}

/// a successfully issued grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedGrant {
    /// unique, time-ordered identifier.
    pub identifier: GrantId,
    /// record name within the scope.
    pub record_name: String,
    /// scope the grant was written to.
    pub scope: String,
    /// role granted.
    pub role: Role,
    /// instant after which the grant is revoked.
    pub expiry: DateTime<Utc>,
}

/// a grant a sweep could not revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantFailure {
    /// scope of the grant.
    pub scope: String,
    /// record name of the grant.
    pub record_name: String,
    /// what went wrong.
    pub cause: FailureCause,
}

/// outcome of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// expired grants removed (including ones already gone when deleted).
    pub revoked: usize,
    /// grants that could not be processed; see `failures`.
    pub failed: usize,
    /// grants still within their lifetime.
    pub active: usize,
    /// per-grant failure details, one entry per `failed`.
    pub failures: Vec<GrantFailure>,
}

impl ReconcileReport {
    fn record_failure(&mut self, grant: &GrantRecord, cause: FailureCause) {
        self.failed += 1;
        self.failures.push(GrantFailure {
            scope: grant.scope.clone(),
            record_name: grant.name.clone(),
            cause,
        });
    }
}

/// compute `now + hours`, rejecting durations that are not positive and finite
/// or that overflow the representable range.
fn expiry_after(now: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    if !hours.is_finite() || hours <= 0.0 {
        return None;
    }
    let micros = (hours * MICROS_PER_HOUR).round();
    if micros >= i64::MAX as f64 {
        return None;
    }
    now.checked_add_signed(Duration::microseconds(micros as i64))
}

/// round up to the next whole millisecond, the precision of the stored text.
fn ceil_to_millis(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let truncated = instant.trunc_subsecs(3);
    if truncated == instant {
        Some(instant)
    } else {
        truncated.checked_add_signed(Duration::milliseconds(1))
    }
}

/// issues grants and revokes them once they expire.
pub struct GrantLifecycleManager {
    store: Arc<dyn GrantStoreBoxed>,
    policy: ScopePolicy,
    identity: GrantIdentity,
    allowed_roles: Vec<Role>,
    ownership: OwnershipConfig,
    clock: Arc<dyn Clock>,
}

impl GrantLifecycleManager {
    /// create a manager over `store` configured from `config`.
    pub fn new(store: Arc<dyn GrantStoreBoxed>, config: &Config) -> Self {
        Self {
            store,
            policy: ScopePolicy::from_config(&config.scope_policy),
            identity: GrantIdentity::new(config.issuance.record_name_prefix.clone()),
            allowed_roles: config.issuance.allowed_roles.clone(),
            ownership: config.ownership.clone(),
            clock: Arc::new(SystemClock),
        }
    }

    /// replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// issue a grant.
    ///
    /// validation happens before any store call; a rejected request has no
    /// side effects. a store failure leaves nothing behind in the manager.
    pub async fn issue(&self, request: IssueRequest) -> Result<IssuedGrant, IssueError> {
        let now = self.clock.now();
        // the stored expiry must never land at or before the issuance instant
        let expiry = expiry_after(now, request.duration_hours)
            .and_then(ceil_to_millis)
            .filter(|expiry| *expiry > now)
            .ok_or(IssueError::InvalidDuration(request.duration_hours))?;

        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(IssueError::InvalidSubject);
        }
        let scope = request.scope.trim();
        if scope.is_empty() {
            return Err(IssueError::InvalidScope);
        }

        if !self.policy.is_eligible(scope) {
            debug!(scope, subject, "rejected grant for restricted scope");
            return Err(IssueError::RestrictedScope(scope.to_string()));
        }

        let role = request
            .role
            .parse::<Role>()
            .ok()
            .filter(|role| self.allowed_roles.contains(role))
            .ok_or_else(|| IssueError::InvalidRole(request.role.clone()))?;

        let identifier = self.identity.mint();
        let record_name = self.identity.derive_record_name(subject);

        let record = GrantRecord::new(
            record_name.clone(),
            scope,
            subject,
            role,
            (
                self.ownership.label_key.as_str(),
                self.ownership.label_value.as_str(),
            ),
            identifier,
            expiry,
        );

        self.store.create_grant(record).await.map_err(|e| {
            warn!(scope, record_name = %record_name, error = %e, "failed to create grant");
            IssueError::StoreUnavailable(e)
        })?;

        info!(
            %identifier,
            scope,
            subject,
            %role,
            record_name = %record_name,
            expiry = %expiry,
            "issued grant"
        );

        Ok(IssuedGrant {
            identifier,
            record_name,
            scope: scope.to_string(),
            role,
            expiry,
        })
    }

    /// list the scopes grants may currently be issued into, in store order.
    ///
    /// each call re-queries the store.
    pub async fn list_eligible_scopes(&self) -> Result<Vec<String>, ListError> {
        let scopes = self.store.list_scopes().await.map_err(|e| {
            warn!(error = %e, "failed to list scopes");
            ListError::StoreUnavailable(e)
        })?;
        Ok(self.policy.filter_eligible(scopes))
    }

    /// run one reconciliation sweep.
    ///
    /// only grants carrying the ownership label are examined. a grant whose
    /// expiry cannot be read is never deleted. per-grant problems are counted
    /// in the report; only a failure to list at all is returned as an error.
    pub async fn reconcile(&self) -> Result<ReconcileReport, ListError> {
        let grants = self
            .store
            .list_owned_grants(
                self.ownership.label_key.clone(),
                self.ownership.label_value.clone(),
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to list owned grants");
                ListError::StoreUnavailable(e)
            })?;

        let now = self.clock.now();
        let mut report = ReconcileReport::default();

        for grant in grants {
            // the store filters by label, but never act on a record we can't
            // prove is ours
            if !grant.is_owned_by(&self.ownership.label_key, &self.ownership.label_value) {
                debug!(scope = %grant.scope, record_name = %grant.name, "skipping unowned record");
                continue;
            }

            let expiry = match grant.state_at(now) {
                GrantState::Active(_) => {
                    report.active += 1;
                    continue;
                }
                GrantState::Expired(expiry) => expiry,
                GrantState::Orphaned(e) => {
                    warn!(
                        scope = %grant.scope,
                        record_name = %grant.name,
                        error = %e,
                        "grant has unusable expiry, leaving in place"
                    );
                    report.record_failure(&grant, FailureCause::Expiry(e));
                    continue;
                }
            };

            match self
                .store
                .delete_grant(grant.scope.clone(), grant.name.clone())
                .await
            {
                Ok(()) => {
                    report.revoked += 1;
                    info!(
                        scope = %grant.scope,
                        record_name = %grant.name,
                        subject = %grant.subject,
                        expiry = %expiry,
                        "revoked expired grant"
                    );
                }
                Err(e) if e.is_not_found() => {
                    report.revoked += 1;
                    debug!(
                        scope = %grant.scope,
                        record_name = %grant.name,
                        "expired grant already removed"
                    );
                }
                Err(e) => {
                    warn!(
                        scope = %grant.scope,
                        record_name = %grant.name,
                        error = %e,
                        "failed to revoke expired grant"
                    );
                    report.record_failure(&grant, FailureCause::Delete(e));
                }
            }
        }

        if report.revoked > 0 || report.failed > 0 {
            info!(
                revoked = report.revoked,
                failed = report.failed,
                active = report.active,
                "reconciliation sweep completed"
            );
        } else {
            debug!(active = report.active, "reconciliation sweep found nothing to revoke");
        }

        Ok(report)
    }
}
