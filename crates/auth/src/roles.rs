use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role value used by the authorization predicates.
///
/// Roles are persisted as reference rows with their own ids; comparisons in
/// policy code are always by this value, never by the row id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    ProjectManager,
    Developer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::ProjectManager, Role::Developer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::ProjectManager => "ProjectManager",
            Role::Developer => "Developer",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
