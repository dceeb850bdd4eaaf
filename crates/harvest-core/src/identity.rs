// crates/harvest-core/src/identity.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::HarvestError;

/// Role an account registers with. Immutable once registered.
///
/// An account with no profile is unregistered; there is no third variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Mints harvest lots and requests certification.
    Producer,
    /// Certifies lots; may be granted DAO membership.
    Inspector,
}

impl Role {
    /// Numeric role code used by wallets (0 = producer, 1 = inspector).
    pub fn from_code(code: u8) -> Option<Role> {
        match code {
            0 => Some(Role::Producer),
            1 => Some(Role::Inspector),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Role::Producer => 0,
            Role::Inspector => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => write!(f, "producer"),
            Role::Inspector => write!(f, "inspector"),
        }
    }
}

impl FromStr for Role {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "producer" | "0" => Ok(Role::Producer),
            "inspector" | "1" => Ok(Role::Inspector),
            _ => Err(HarvestError::InvalidInput),
        }
    }
}

/// Registered profile of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub account: Address,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Timestamp of the registering transaction.
    pub registered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes() {
        assert_eq!(Role::from_code(0), Some(Role::Producer));
        assert_eq!(Role::from_code(1), Some(Role::Inspector));
        assert_eq!(Role::from_code(2), None);
        assert_eq!(Role::Inspector.code(), 1);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Producer".parse::<Role>().unwrap(), Role::Producer);
        assert_eq!("1".parse::<Role>().unwrap(), Role::Inspector);
        assert!("farmer".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&Role::Inspector).unwrap();
        assert_eq!(json, "\"inspector\"");
    }
}
