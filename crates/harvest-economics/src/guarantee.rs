// crates/harvest-economics/src/guarantee.rs
//
// Inspector guarantee escrow.
//
// An inspector locks a stake when taking a process inspection for a
// proposal. The stake ends in exactly one of two ways:
//   - Refunded: inspection passed, stake returned (the fee is paid on top
//     by governance, not tracked here).
//   - Forfeited: inspection failed, stake kept in governance holdings.
//
// This module only keeps the books; token movement is done by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvest_core::error::HarvestError;
use harvest_core::{Address, Amount, ProposalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeStatus {
    Locked,
    Refunded,
    Forfeited,
}

/// A single stake locked by an inspector for one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeEntry {
    pub inspector: Address,
    pub proposal_id: ProposalId,
    pub amount: Amount,
    pub locked_at: DateTime<Utc>,
    pub status: GuaranteeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuaranteeEscrow {
    /// inspector -> proposal -> entry.
    entries: BTreeMap<Address, BTreeMap<ProposalId, GuaranteeEntry>>,
}

impl GuaranteeEscrow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a locked stake.
    ///
    /// # Errors
    /// Returns `InspectorAlreadyAssigned` if a stake already exists for this
    /// inspector and proposal.
    pub fn lock(
        &mut self,
        inspector: &Address,
        proposal_id: ProposalId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), HarvestError> {
        let per_inspector = self.entries.entry(*inspector).or_default();
        if per_inspector.contains_key(&proposal_id) {
            return Err(HarvestError::InspectorAlreadyAssigned);
        }
        per_inspector.insert(
            proposal_id,
            GuaranteeEntry {
                inspector: *inspector,
                proposal_id,
                amount,
                locked_at: now,
                status: GuaranteeStatus::Locked,
            },
        );
        Ok(())
    }

    /// Mark a locked stake refunded and return its amount.
    pub fn release(&mut self, inspector: &Address, proposal_id: ProposalId) -> Result<Amount, HarvestError> {
        self.settle(inspector, proposal_id, GuaranteeStatus::Refunded)
    }

    /// Mark a locked stake forfeited and return its amount.
    pub fn forfeit(&mut self, inspector: &Address, proposal_id: ProposalId) -> Result<Amount, HarvestError> {
        self.settle(inspector, proposal_id, GuaranteeStatus::Forfeited)
    }

    fn settle(
        &mut self,
        inspector: &Address,
        proposal_id: ProposalId,
        outcome: GuaranteeStatus,
    ) -> Result<Amount, HarvestError> {
        let entry = self
            .entries
            .get_mut(inspector)
            .and_then(|p| p.get_mut(&proposal_id))
            .ok_or(HarvestError::YouAreNotTheInspectorOfThisProposal)?;
        if entry.status != GuaranteeStatus::Locked {
            return Err(HarvestError::InspectionAlreadyFinalized);
        }
        entry.status = outcome;
        Ok(entry.amount)
    }

    pub fn entry(&self, inspector: &Address, proposal_id: ProposalId) -> Option<&GuaranteeEntry> {
        self.entries.get(inspector).and_then(|p| p.get(&proposal_id))
    }

    /// Stake recorded for (inspector, proposal), zero if none.
    pub fn amount_of(&self, inspector: &Address, proposal_id: ProposalId) -> Amount {
        self.entry(inspector, proposal_id).map(|e| e.amount).unwrap_or(0)
    }

    /// Sum of stakes still locked.
    pub fn total_locked(&self) -> Amount {
        self.entries
            .values()
            .flat_map(|p| p.values())
            .filter(|e| e.status == GuaranteeStatus::Locked)
            .map(|e| e.amount)
            .sum()
    }
}
