// crates/harvest-ledger/src/lots.rs
//
// Harvest Ledger: semi-fungible lot tokens.
//
// Each mint allocates the next sequential lot id (starting at 0) and credits
// the full unit count to the minting producer. Balances are tracked per
// (holder, lot). The certification flag starts false and is flipped once,
// through `LotBook::mark_certified`, by the certification workflow.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::Role;
use harvest_core::traits::{LotBook, RoleDirectory};
use harvest_core::{Address, LotId};

/// Per-lot metadata stored at mint time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotMetadata {
    pub lot_id: LotId,
    /// Product name, e.g. "cucumber".
    pub name: String,
    pub units_per_token: u64,
    /// Units minted. Burns reduce holder balances, not this figure.
    pub total_units: u64,
    pub creator: Address,
    pub certified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestLedger {
    /// Next lot id to allocate; equals the number of lots ever minted.
    next_lot_id: LotId,
    lots: BTreeMap<LotId, LotMetadata>,
    /// holder -> lot -> units. Zeroed entries are removed.
    balances: BTreeMap<Address, BTreeMap<LotId, u64>>,
}

impl HarvestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new lot to `caller`.
    ///
    /// # Errors
    /// - `InsufficientRole` unless the caller is a registered producer.
    /// - `InvalidParameters` if `total_units`, `name` or `units_per_token`
    ///   is zero or empty.
    pub fn mint(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        total_units: u64,
        name: &str,
        units_per_token: u64,
        now: DateTime<Utc>,
    ) -> Result<HarvestEvent, HarvestError> {
        roles.require_role(caller, Role::Producer)?;

        let name = name.trim();
        if total_units == 0 || name.is_empty() || units_per_token == 0 {
            return Err(HarvestError::InvalidParameters);
        }

        let lot_id = self.next_lot_id;
        self.lots.insert(
            lot_id,
            LotMetadata {
                lot_id,
                name: name.to_string(),
                units_per_token,
                total_units,
                creator: *caller,
                certified: false,
                created_at: now,
            },
        );
        *self
            .balances
            .entry(*caller)
            .or_default()
            .entry(lot_id)
            .or_insert(0) += total_units;
        self.next_lot_id += 1;

        info!(lot_id, producer = %caller, total_units, name, "Minted lot");

        Ok(HarvestEvent::CreatedLot {
            producer: *caller,
            lot_id,
            total_units,
            name: name.to_string(),
            units_per_token,
        })
    }

    /// Burn `amount` units of `lot_id` held by `caller`.
    ///
    /// # Errors
    /// - `InsufficientRole` unless the caller is a registered producer.
    /// - `NotEnoughToken` if the caller holds fewer than `amount` units.
    pub fn burn(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        lot_id: LotId,
        amount: u64,
    ) -> Result<HarvestEvent, HarvestError> {
        roles.require_role(caller, Role::Producer)?;

        let available = self.units_of(caller, lot_id);
        if available < amount {
            return Err(HarvestError::NotEnoughToken {
                requested: amount,
                available,
            });
        }

        if let Some(holdings) = self.balances.get_mut(caller) {
            let remaining = available - amount;
            if remaining == 0 {
                holdings.remove(&lot_id);
            } else {
                holdings.insert(lot_id, remaining);
            }
            if holdings.is_empty() {
                self.balances.remove(caller);
            }
        }

        info!(lot_id, producer = %caller, amount, "Burned lot units");

        Ok(HarvestEvent::BurnedLot {
            producer: *caller,
            lot_id,
            amount,
        })
    }

    pub fn metadata(&self, lot_id: LotId) -> Option<&LotMetadata> {
        self.lots.get(&lot_id)
    }

    /// Number of lots ever minted.
    pub fn lot_count(&self) -> u64 {
        self.next_lot_id
    }

    /// Units of `lot_id` currently held across all holders.
    pub fn circulating_units(&self, lot_id: LotId) -> u64 {
        self.balances
            .values()
            .filter_map(|holdings| holdings.get(&lot_id))
            .sum()
    }

    /// Lots held by `holder`, as (lot id, units) pairs.
    pub fn holdings_of(&self, holder: &Address) -> Vec<(LotId, u64)> {
        self.balances
            .get(holder)
            .map(|h| h.iter().map(|(id, units)| (*id, *units)).collect())
            .unwrap_or_default()
    }

    /// JSON metadata document for a lot, the off-chain stand-in for a
    /// token URI.
    pub fn metadata_document(&self, lot_id: LotId) -> Option<serde_json::Value> {
        let lot = self.lots.get(&lot_id)?;
        Some(json!({
            "name": lot.name,
            "description": format!(
                "Harvest lot #{} of {} ({} units, {} per token)",
                lot.lot_id, lot.name, lot.total_units, lot.units_per_token
            ),
            "properties": {
                "lot_id": lot.lot_id,
                "creator": lot.creator,
                "units_per_token": lot.units_per_token,
                "total_units": lot.total_units,
                "certified": lot.certified,
                "created_at": lot.created_at,
            }
        }))
    }
}

impl LotBook for HarvestLedger {
    fn lot_exists(&self, lot_id: LotId) -> bool {
        self.lots.contains_key(&lot_id)
    }

    fn units_of(&self, holder: &Address, lot_id: LotId) -> u64 {
        self.balances
            .get(holder)
            .and_then(|h| h.get(&lot_id))
            .copied()
            .unwrap_or(0)
    }

    fn is_certified(&self, lot_id: LotId) -> bool {
        self.lots.get(&lot_id).map(|l| l.certified).unwrap_or(false)
    }

    fn mark_certified(&mut self, lot_id: LotId) -> Result<(), HarvestError> {
        let lot = self
            .lots
            .get_mut(&lot_id)
            .ok_or(HarvestError::TokenDoesNotExist)?;
        if lot.certified {
            return Err(HarvestError::AlreadyCertified);
        }
        lot.certified = true;
        info!(lot_id, "Lot certified");
        Ok(())
    }
}
