// crates/harvest-runtime/src/desk.rs
//
// Inspector desk: the inspector-facing entry point for process inspections.
//
// The desk checks the Inspector role, then forwards to governance. Its
// address is the spender an inspector approves before taking an
// assignment, so the stake can be pulled without governance ever holding
// an allowance of its own.

use chrono::{DateTime, Utc};

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::Role;
use harvest_core::traits::RoleDirectory;
use harvest_core::{Address, Amount, ProposalId};

use crate::state::PlatformState;

/// Label the desk address is derived from.
pub const DESK_LABEL: &str = "inspector-desk";

pub struct InspectorDesk;

impl InspectorDesk {
    /// Spender address inspectors approve for their stake.
    pub fn address() -> Address {
        Address::from_label(DESK_LABEL)
    }

    /// Take the process inspection of a passed proposal, locking
    /// `guaranteed_amount` of the caller's settlement tokens.
    pub fn assign_inspector_to_proposal(
        state: &mut PlatformState,
        caller: &Address,
        index: ProposalId,
        guaranteed_amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        let PlatformState {
            registry,
            governance,
            token,
            ..
        } = state;
        registry.require_role(caller, Role::Inspector)?;

        governance.assign_inspector_to_proposal(
            &*registry,
            token,
            &Self::address(),
            index,
            caller,
            guaranteed_amount,
            now,
        )
    }

    /// Pass the inspection: stake refunded plus the fixed inspector fee.
    pub fn approve_process_inspection(
        state: &mut PlatformState,
        caller: &Address,
        index: ProposalId,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        Self::finalize(state, caller, index, true)
    }

    /// Fail the inspection: stake forfeited to governance holdings.
    pub fn fail_process_inspection(
        state: &mut PlatformState,
        caller: &Address,
        index: ProposalId,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        Self::finalize(state, caller, index, false)
    }

    fn finalize(
        state: &mut PlatformState,
        caller: &Address,
        index: ProposalId,
        passed: bool,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        let PlatformState {
            registry,
            governance,
            token,
            ..
        } = state;
        registry.require_role(caller, Role::Inspector)?;

        let fee = governance.params().inspector_fee;
        governance.set_passed_inspection(token, caller, caller, index, passed, fee)
    }
}
