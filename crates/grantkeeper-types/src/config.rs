//! configuration types for grantkeeper

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::role::Role;

/// main configuration for grantkeeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// log level: trace, debug, info, warn or error.
    pub log_level: String,

    /// which scopes may receive grants.
    pub scope_policy: ScopePolicyConfig,

    /// issuance options.
    pub issuance: IssuanceConfig,

    /// label identifying grants created by this manager.
    pub ownership: OwnershipConfig,

    /// background reconciliation options.
    pub reconcile: ReconcileConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scope_policy: ScopePolicyConfig::default(),
            issuance: IssuanceConfig::default(),
            ownership: OwnershipConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl Config {
    /// parse configuration from toml text and validate it.
    ///
    /// missing sections and fields fall back to their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if self
            .scope_policy
            .restricted_suffixes
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Err(Error::Config(
                "scope_policy.restricted_suffixes cannot contain empty entries".into(),
            ));
        }
        if self.issuance.record_name_prefix.trim().is_empty() {
            return Err(Error::Config(
                "issuance.record_name_prefix cannot be empty".into(),
            ));
        }
        if self.issuance.allowed_roles.is_empty() {
            return Err(Error::Config(
                "issuance.allowed_roles must name at least one role".into(),
            ));
        }
        if self.ownership.label_key.trim().is_empty()
            || self.ownership.label_value.trim().is_empty()
        {
            return Err(Error::Config(
                "ownership label key and value cannot be empty".into(),
            ));
        }
        if self.reconcile.interval_secs == 0 {
            return Err(Error::Config(
                "reconcile.interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// scope eligibility configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopePolicyConfig {
    /// scopes ending with any of these suffixes are restricted.
    pub restricted_suffixes: Vec<String>,
}

impl Default for ScopePolicyConfig {
    fn default() -> Self {
        Self {
            restricted_suffixes: vec!["-prod".to_string()],
        }
    }
}

/// issuance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceConfig {
    /// prefix for derived record names.
    pub record_name_prefix: String,

    /// roles that may be granted.
    pub allowed_roles: Vec<Role>,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            record_name_prefix: "rbactool".to_string(),
            allowed_roles: Role::ALL.to_vec(),
        }
    }
}

/// ownership marker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipConfig {
    /// label key.
    pub label_key: String,

    /// label value.
    pub label_value: String,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            label_key: "created-by".to_string(),
            label_value: "rbac-tool".to_string(),
        }
    }
}

/// reconciliation scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// whether the background sweep runs at all.
    pub enabled: bool,

    /// seconds between sweeps.
    pub interval_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl ReconcileConfig {
    /// the sweep interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
