// crates/harvest-economics/src/token.rs
//
// Settlement token: a fungible balance/allowance ledger.
//
// Supply is fixed at genesis and allocated to the genesis owner; there is
// no mint or burn afterwards. Transfers between accounts and allowance
// spending are the only ways balances move.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::traits::SettlementLedger;
use harvest_core::{Address, Amount};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementToken {
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    /// owner -> spender -> remaining allowance.
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
}

impl SettlementToken {
    /// Create an empty token with no supply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token whose whole `supply` is held by `owner`.
    pub fn with_genesis(owner: Address, supply: Amount) -> Self {
        let mut balances = BTreeMap::new();
        if supply > 0 {
            balances.insert(owner, supply);
        }
        Self {
            total_supply: supply,
            balances,
            allowances: BTreeMap::new(),
        }
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Accounts with a non-zero balance, in address order.
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.balances.iter().map(|(a, b)| (*a, *b)).collect()
    }

    fn debit(&mut self, account: &Address, amount: Amount) -> Result<(), HarvestError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(HarvestError::NotSufficientBalance {
                requested: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: Amount) {
        if amount > 0 {
            *self.balances.entry(*account).or_insert(0) += amount;
        }
    }
}

impl SettlementLedger for SettlementToken {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|s| s.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<HarvestEvent, HarvestError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        debug!(%from, %to, amount, "Settlement transfer");
        Ok(HarvestEvent::TokenTransferred {
            from: *from,
            to: *to,
            amount,
        })
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<HarvestEvent, HarvestError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(HarvestError::NotSufficientAllowance {
                requested: amount,
                allowed,
            });
        }
        self.debit(from, amount)?;
        self.credit(to, amount);

        if let Some(spenders) = self.allowances.get_mut(from) {
            spenders.insert(*spender, allowed - amount);
        }
        debug!(%spender, %from, %to, amount, "Settlement transfer_from");
        Ok(HarvestEvent::TokenTransferred {
            from: *from,
            to: *to,
            amount,
        })
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> HarvestEvent {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        HarvestEvent::TokenApproved {
            owner: *owner,
            spender: *spender,
            amount,
        }
    }
}
