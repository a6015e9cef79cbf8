//! grantable roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// the permission level carried by a grant.
///
/// the set is closed on purpose: an arbitrary string is never forwarded to
/// the store as a privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// read-only access.
    View,
    /// read-write access.
    Edit,
}

impl Role {
    /// every known role, in privilege order.
    pub const ALL: [Role; 2] = [Role::View, Role::Edit];

    /// the canonical lowercase name, as written to the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::View => "view",
            Role::Edit => "edit",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Role::View),
            "edit" => Ok(Role::Edit),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}
