//! the persisted grant record.
//!
//! a grant is stored as a named record inside a scope. ownership is carried
//! as a label so reconciliation can list only its own grants; the identifier
//! and expiry are carried as annotations in canonical text.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::grant_id::GrantId;
use crate::role::Role;

/// annotation key holding the grant identifier.
pub const ANNOTATION_IDENTIFIER: &str = "identifier";

/// annotation key holding the canonical expiry timestamp.
pub const ANNOTATION_EXPIRY: &str = "expiry";

/// format an expiry instant as canonical rfc 3339 text.
///
/// sub-millisecond precision is dropped; callers that need the text to parse
/// back to the identical instant should truncate first (see [`GrantRecord::new`]).
pub fn format_expiry(expiry: DateTime<Utc>) -> String {
    expiry.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// parse expiry text written by [`format_expiry`] or any rfc 3339 producer.
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidExpiry {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// automated-reconciliation state of a persisted grant.
///
/// a revoked grant no longer exists in the store, so it has no state here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantState {
    /// `now <= expiry`.
    Active(DateTime<Utc>),
    /// `now > expiry`, still persisted, due for revocation.
    Expired(DateTime<Utc>),
    /// expiry missing or unparseable. never revoked automatically.
    Orphaned(Error),
}

/// a grant as persisted in the underlying store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// record name, the lookup/delete key within the scope.
    pub name: String,

    /// scope the grant applies to.
    pub scope: String,

    /// principal receiving access.
    pub subject: String,

    /// permission level granted.
    pub role: Role,

    /// labels used for filtered listing (ownership marker lives here).
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// durable metadata: identifier and expiry.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl GrantRecord {
    /// build a record carrying the ownership label, identifier and expiry.
    ///
    /// the expiry is truncated to whole milliseconds so that the annotation
    /// text parses back to exactly the instant returned by [`Self::expiry`].
    /// callers that must not shorten a lifetime round up before calling.
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        subject: impl Into<String>,
        role: Role,
        ownership: (&str, &str),
        identifier: GrantId,
        expiry: DateTime<Utc>,
    ) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(ownership.0.to_string(), ownership.1.to_string());

        let mut annotations = BTreeMap::new();
        annotations.insert(ANNOTATION_IDENTIFIER.to_string(), identifier.to_string());
        annotations.insert(
            ANNOTATION_EXPIRY.to_string(),
            format_expiry(expiry.trunc_subsecs(3)),
        );

        Self {
            name: name.into(),
            scope: scope.into(),
            subject: subject.into(),
            role,
            labels,
            annotations,
        }
    }

    /// whether the record carries the given ownership label.
    pub fn is_owned_by(&self, key: &str, value: &str) -> bool {
        self.labels.get(key).map(String::as_str) == Some(value)
    }

    /// raw expiry annotation, if present.
    pub fn expiry_text(&self) -> Option<&str> {
        self.annotations.get(ANNOTATION_EXPIRY).map(String::as_str)
    }

    /// parsed expiry.
    pub fn expiry(&self) -> Result<DateTime<Utc>, Error> {
        match self.expiry_text() {
            Some(text) if !text.trim().is_empty() => parse_expiry(text),
            _ => Err(Error::MissingExpiry),
        }
    }

    /// parsed identifier.
    pub fn identifier(&self) -> Result<GrantId, Error> {
        let text = self
            .annotations
            .get(ANNOTATION_IDENTIFIER)
            .map(String::as_str)
            .unwrap_or_default();
        text.parse()
    }

    /// classify the grant against `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> GrantState {
        match self.expiry() {
            Ok(expiry) if now > expiry => GrantState::Expired(expiry),
            Ok(expiry) => GrantState::Active(expiry),
            Err(e) => GrantState::Orphaned(e),
        }
    }
}
