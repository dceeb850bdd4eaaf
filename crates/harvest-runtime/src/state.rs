// crates/harvest-runtime/src/state.rs
//
// The whole platform state as one cloneable, serializable value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use harvest_certification::{CertificationWorkflow, ProtocolRegistry};
use harvest_core::error::HarvestError;
use harvest_core::traits::SettlementLedger;
use harvest_core::Address;
use harvest_economics::token::SettlementToken;
use harvest_governance::GovernanceCenter;
use harvest_ledger::{HarvestLedger, IdentityRegistry};

use crate::genesis::GenesisConfig;

/// Component state, each field owned by its component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformState {
    pub registry: IdentityRegistry,
    pub ledger: HarvestLedger,
    pub certification: CertificationWorkflow,
    pub protocols: ProtocolRegistry,
    pub governance: GovernanceCenter,
    pub token: SettlementToken,
    /// Next expected nonce per signer.
    pub nonces: BTreeMap<Address, u64>,
    /// Number of committed transactions.
    pub height: u64,
}

impl PlatformState {
    /// Build the initial state from a genesis config.
    pub fn genesis(config: &GenesisConfig) -> Result<Self, HarvestError> {
        config.validate()?;

        let governance = GovernanceCenter::new(
            config.owner,
            config.params.clone(),
            config.marketplace_operator,
        );
        let mut token = SettlementToken::with_genesis(config.owner, config.settlement_supply);
        if config.governance_allocation > 0 {
            token.transfer(
                &config.owner,
                &governance.holdings_address(),
                config.governance_allocation,
            )?;
        }

        Ok(Self {
            registry: IdentityRegistry::new(),
            ledger: HarvestLedger::new(),
            certification: CertificationWorkflow::new(),
            protocols: ProtocolRegistry::new(),
            governance,
            token,
            nonces: BTreeMap::new(),
            height: 0,
        })
    }

    pub fn next_nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_allocates_supply() {
        let owner = Address([1u8; 20]);
        let mut config = GenesisConfig::new(owner);
        config.settlement_supply = 1_000;
        config.governance_allocation = 400;

        let state = PlatformState::genesis(&config).unwrap();
        assert_eq!(state.token.balance_of(&owner), 600);
        assert_eq!(
            state.token.balance_of(&state.governance.holdings_address()),
            400
        );
        assert_eq!(state.height, 0);
        assert_eq!(state.next_nonce(&owner), 0);
    }

    #[test]
    fn test_state_json_roundtrip() {
        let config = GenesisConfig::new(Address([1u8; 20]));
        let state = PlatformState::genesis(&config).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: PlatformState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.governance.owner(), Address([1u8; 20]));
    }
}
