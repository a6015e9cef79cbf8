//! test utilities for building grant records.
//!
//! records built here skip issuance validation, which is the point: tests
//! use them to seed stores with expired, foreign or corrupt grants.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use ulid::Ulid;

use crate::grant::{ANNOTATION_EXPIRY, ANNOTATION_IDENTIFIER, GrantRecord, format_expiry};
use crate::role::Role;

/// builder for test [`GrantRecord`] instances.
///
/// # example
/// ```ignore
/// use grantkeeper_types::test_utils::TestGrantBuilder;
///
/// let expired = TestGrantBuilder::new("alice").expired().build();
/// let corrupt = TestGrantBuilder::new("bob").with_raw_expiry("not-a-date").build();
/// assert_ne!(expired.name, corrupt.name);
/// ```
#[derive(Debug, Clone)]
pub struct TestGrantBuilder {
    subject: String,
    scope: String,
    role: Role,
    name: Option<String>,
    labels: BTreeMap<String, String>,
    identifier: Option<String>,
    expiry: Option<String>,
}

impl TestGrantBuilder {
    /// a grant for `subject` in scope `team-a`, owned with the default label,
    /// expiring one hour from now.
    pub fn new(subject: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("created-by".to_string(), "rbac-tool".to_string());
        Self {
            subject: subject.into(),
            scope: "team-a".to_string(),
            role: Role::View,
            name: None,
            labels,
            identifier: Some(Ulid::new().to_string()),
            expiry: Some(format_expiry(Utc::now() + Duration::hours(1))),
        }
    }

    /// set the scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// override the record name (defaults to `rbactool-<lowercased subject>`).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// set the expiry instant.
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(format_expiry(expiry));
        self
    }

    /// set the expiry annotation to arbitrary text.
    pub fn with_raw_expiry(mut self, text: impl Into<String>) -> Self {
        self.expiry = Some(text.into());
        self
    }

    /// drop the expiry annotation entirely.
    pub fn without_expiry(mut self) -> Self {
        self.expiry = None;
        self
    }

    /// expired one hour ago.
    pub fn expired(self) -> Self {
        self.with_expiry(Utc::now() - Duration::hours(1))
    }

    /// replace the ownership label.
    pub fn owned_by(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.clear();
        self.labels.insert(key.into(), value.into());
        self
    }

    /// remove every label, making the record foreign to the manager.
    pub fn unowned(mut self) -> Self {
        self.labels.clear();
        self
    }

    /// build the record.
    pub fn build(self) -> GrantRecord {
        let name = self
            .name
            .unwrap_or_else(|| format!("rbactool-{}", self.subject.to_lowercase()));

        let mut annotations = BTreeMap::new();
        if let Some(id) = self.identifier {
            annotations.insert(ANNOTATION_IDENTIFIER.to_string(), id);
        }
        if let Some(expiry) = self.expiry {
            annotations.insert(ANNOTATION_EXPIRY.to_string(), expiry);
        }

        GrantRecord {
            name,
            scope: self.scope,
            subject: self.subject,
            role: self.role,
            labels: self.labels,
            annotations,
        }
    }
}
