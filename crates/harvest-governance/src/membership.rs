// crates/harvest-governance/src/membership.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use harvest_core::Address;

/// Inspectors holding proposal and voting rights.
///
/// Independent of the registry role: a registered inspector is not a
/// member until the owner adds them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaoMembership {
    members: BTreeSet<Address>,
}

impl DaoMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the account was already a member.
    pub fn add(&mut self, account: Address) -> bool {
        self.members.insert(account)
    }

    /// Returns `false` if the account was not a member.
    pub fn remove(&mut self, account: &Address) -> bool {
        self.members.remove(account)
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}
