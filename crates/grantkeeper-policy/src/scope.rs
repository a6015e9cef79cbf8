//! scope eligibility.

use grantkeeper_types::ScopePolicyConfig;

/// decides whether a scope may receive grants.
///
/// a scope is restricted when it ends with any configured suffix. matching
/// ignores ascii case, so `payments-PROD` is as restricted as `payments-prod`.
/// the same predicate gates both scope listing and issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    restricted_suffixes: Vec<String>,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::from_config(&ScopePolicyConfig::default())
    }
}

impl ScopePolicy {
    /// create a policy from restricted suffixes.
    pub fn new<I, S>(restricted_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            restricted_suffixes: restricted_suffixes
                .into_iter()
                .map(|s| Into::<String>::into(s).to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// create a policy from configuration.
    pub fn from_config(config: &ScopePolicyConfig) -> Self {
        Self::new(config.restricted_suffixes.iter().cloned())
    }

    /// whether `scope` is eligible for grant issuance.
    pub fn is_eligible(&self, scope: &str) -> bool {
        let scope = scope.to_ascii_lowercase();
        !self
            .restricted_suffixes
            .iter()
            .any(|suffix| scope.ends_with(suffix.as_str()))
    }

    /// keep only eligible scopes, preserving order.
    pub fn filter_eligible<I>(&self, scopes: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        scopes.into_iter().filter(|s| self.is_eligible(s)).collect()
    }
}
