//! Strongly-typed identifiers used across the domain.
//!
//! Every persisted entity is keyed by a store-assigned positive integer. The
//! newtypes keep a `ProjectId` from being passed where a `UserId` is expected.

use core::num::ParseIntError;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identifier of a company (tenant boundary).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(i64);

/// Identifier of a user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a project.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

/// Identifier of a ticket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

/// Identifier of a role reference row (not the role value itself).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

macro_rules! impl_numeric_newtype {
    ($t:ty) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

impl_numeric_newtype!(CompanyId);
impl_numeric_newtype!(UserId);
impl_numeric_newtype!(ProjectId);
impl_numeric_newtype!(TicketId);
impl_numeric_newtype!(RoleId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&ProjectId::new(42)).unwrap();
        assert_eq!(json, "42");

        let back: ProjectId = serde_json::from_str("42").unwrap();
        assert_eq!(back, ProjectId::new(42));
    }

    #[test]
    fn ids_parse_from_path_segments() {
        assert_eq!("7".parse::<UserId>().unwrap(), UserId::new(7));
        assert!("seven".parse::<UserId>().is_err());
    }
}
