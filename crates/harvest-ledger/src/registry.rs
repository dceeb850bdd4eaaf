// crates/harvest-ledger/src/registry.rs
//
// Identity Registry: maps an address to a role and profile.
//
// Registration happens exactly once per address. There is no update or
// deregistration path, so a role never changes after it is assigned.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::{Profile, Role};
use harvest_core::traits::RoleDirectory;
use harvest_core::Address;

/// Registered accounts, keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityRegistry {
    profiles: BTreeMap<Address, Profile>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `caller` with a profile and role.
    ///
    /// # Errors
    /// - `AlreadyRegistered` if the caller already has a profile.
    /// - `InvalidInput` if username or email is empty after trimming.
    pub fn register(
        &mut self,
        caller: &Address,
        username: &str,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<HarvestEvent, HarvestError> {
        if self.profiles.contains_key(caller) {
            return Err(HarvestError::AlreadyRegistered);
        }

        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(HarvestError::InvalidInput);
        }

        self.profiles.insert(
            *caller,
            Profile {
                account: *caller,
                username: username.to_string(),
                email: email.to_string(),
                role,
                registered_at: now,
            },
        );
        info!(account = %caller, %role, "Registered account");

        Ok(HarvestEvent::UserRegistered {
            account: *caller,
            username: username.to_string(),
            email: email.to_string(),
            role,
        })
    }

    pub fn profile(&self, account: &Address) -> Option<&Profile> {
        self.profiles.get(account)
    }

    pub fn registered_count(&self) -> usize {
        self.profiles.len()
    }

    /// All accounts holding `role`, in address order.
    pub fn accounts_with_role(&self, role: Role) -> Vec<Address> {
        self.profiles
            .values()
            .filter(|p| p.role == role)
            .map(|p| p.account)
            .collect()
    }
}

impl RoleDirectory for IdentityRegistry {
    fn role_of(&self, account: &Address) -> Option<Role> {
        self.profiles.get(account).map(|p| p.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address([1u8; 20])
    }

    #[test]
    fn test_register_once() {
        let mut registry = IdentityRegistry::new();
        let event = registry
            .register(&alice(), "alice", "alice@farm.io", Role::Producer, Utc::now())
            .unwrap();
        assert_eq!(event.name(), "user_registered");
        assert_eq!(registry.role_of(&alice()), Some(Role::Producer));
        assert_eq!(registry.registered_count(), 1);
    }

    #[test]
    fn test_second_registration_fails() {
        let mut registry = IdentityRegistry::new();
        registry
            .register(&alice(), "alice", "alice@farm.io", Role::Producer, Utc::now())
            .unwrap();
        let result = registry.register(&alice(), "alice2", "a2@farm.io", Role::Inspector, Utc::now());
        assert_eq!(result, Err(HarvestError::AlreadyRegistered));
        // Role is unchanged.
        assert_eq!(registry.role_of(&alice()), Some(Role::Producer));
    }

    #[test]
    fn test_empty_username_or_email_rejected() {
        let mut registry = IdentityRegistry::new();
        assert_eq!(
            registry.register(&alice(), "", "alice@farm.io", Role::Producer, Utc::now()),
            Err(HarvestError::InvalidInput)
        );
        assert_eq!(
            registry.register(&alice(), "alice", "   ", Role::Producer, Utc::now()),
            Err(HarvestError::InvalidInput)
        );
        assert_eq!(registry.registered_count(), 0);
    }

    #[test]
    fn test_require_role() {
        let mut registry = IdentityRegistry::new();
        registry
            .register(&alice(), "alice", "alice@farm.io", Role::Inspector, Utc::now())
            .unwrap();
        assert!(registry.require_role(&alice(), Role::Inspector).is_ok());
        assert_eq!(
            registry.require_role(&alice(), Role::Producer),
            Err(HarvestError::InsufficientRole)
        );
        assert_eq!(
            registry.require_role(&Address([2u8; 20]), Role::Inspector),
            Err(HarvestError::InsufficientRole)
        );
    }

    #[test]
    fn test_accounts_with_role() {
        let mut registry = IdentityRegistry::new();
        let bob = Address([2u8; 20]);
        registry
            .register(&alice(), "alice", "a@farm.io", Role::Producer, Utc::now())
            .unwrap();
        registry
            .register(&bob, "bob", "b@farm.io", Role::Inspector, Utc::now())
            .unwrap();
        assert_eq!(registry.accounts_with_role(Role::Inspector), vec![bob]);
    }
}
