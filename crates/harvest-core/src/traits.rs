// crates/harvest-core/src/traits.rs
//
// Interfaces components expose to each other. State stays with the
// component that defines it; other components only go through these.

use crate::address::Address;
use crate::error::HarvestError;
use crate::events::HarvestEvent;
use crate::identity::Role;
use crate::{Amount, LotId, ProtocolId};

/// Role lookups backed by the Identity Registry.
///
/// Implemented by `harvest-ledger::registry::IdentityRegistry`.
pub trait RoleDirectory {
    /// Role of a registered account, `None` if unregistered.
    fn role_of(&self, account: &Address) -> Option<Role>;

    /// Capability gate used by every other component.
    fn require_role(&self, account: &Address, role: Role) -> Result<(), HarvestError> {
        match self.role_of(account) {
            Some(held) if held == role => Ok(()),
            _ => Err(HarvestError::InsufficientRole),
        }
    }
}

/// Lot accessors the certification workflow needs.
///
/// Implemented by `harvest-ledger::lots::HarvestLedger`.
pub trait LotBook {
    fn lot_exists(&self, lot_id: LotId) -> bool;

    /// Units of `lot_id` held by `holder`.
    fn units_of(&self, holder: &Address, lot_id: LotId) -> u64;

    fn is_certified(&self, lot_id: LotId) -> bool;

    /// Flip the certification flag. Fails with `TokenDoesNotExist` for an
    /// unknown lot and `AlreadyCertified` if the flag is already set.
    fn mark_certified(&mut self, lot_id: LotId) -> Result<(), HarvestError>;
}

/// Protocol-request flags consumed by governance.
///
/// Implemented by `harvest-certification::protocol::ProtocolRegistry`.
pub trait ProtocolBook {
    fn is_protocol_requested(&self, producer: &Address, protocol_id: ProtocolId) -> bool;

    /// Clear the flag after a passing proposal execution.
    fn clear_protocol_request(&mut self, producer: &Address, protocol_id: ProtocolId);
}

/// Fungible settlement-token ledger.
///
/// Implemented by `harvest-economics::token::SettlementToken`. Mutating
/// operations return the event to emit on success.
pub trait SettlementLedger {
    fn balance_of(&self, account: &Address) -> Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<HarvestEvent, HarvestError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<HarvestEvent, HarvestError>;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> HarvestEvent;
}
