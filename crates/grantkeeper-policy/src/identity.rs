//! grant identifiers and record names.

use std::fmt;
use std::sync::Mutex;

use grantkeeper_types::GrantId;
use tracing::debug;
use ulid::{Generator, Ulid};

/// mints grant identifiers and derives record names.
///
/// identifiers come from a monotonic ulid generator shared by every caller,
/// so identifiers minted by one instance never go backwards while the wall
/// clock moves forward, and two identifiers minted in the same millisecond
/// still sort in mint order.
pub struct GrantIdentity {
    prefix: String,
    generator: Mutex<Generator>,
}

impl fmt::Debug for GrantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantIdentity")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl GrantIdentity {
    /// create an identity minter using `prefix` for record names.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            generator: Mutex::new(Generator::new()),
        }
    }

    /// mint a new identifier.
    pub fn mint(&self) -> GrantId {
        let mut generator = self.generator.lock().unwrap_or_else(|e| e.into_inner());
        match generator.generate() {
            Ok(ulid) => GrantId::from_ulid(ulid),
            Err(e) => {
                // random component overflowed within one millisecond
                debug!(error = ?e, "monotonic ulid overflow, minting fresh ulid");
                GrantId::from_ulid(Ulid::new())
            }
        }
    }

    /// derive the record name for `subject`: `<prefix>-<lowercased subject>`.
    ///
    /// deterministic on purpose. a second grant for the same subject in the
    /// same scope lands on the same record and replaces it.
    pub fn derive_record_name(&self, subject: &str) -> String {
        format!("{}-{}", self.prefix, subject.trim().to_lowercase())
    }
}
