// crates/harvest-runtime/src/genesis.rs
//
// Genesis parameters: who owns governance, who reports marketplace sales,
// how much settlement token exists, and the fixed protocol constants.

use serde::{Deserialize, Serialize};

use harvest_core::error::HarvestError;
use harvest_core::params::ProtocolParams;
use harvest_core::{Address, Amount};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Governance owner; receives the settlement supply.
    pub owner: Address,
    /// Account allowed to report purchases. `None` means the owner.
    #[serde(default)]
    pub marketplace_operator: Option<Address>,
    /// Total settlement-token supply, fixed forever.
    #[serde(default)]
    pub settlement_supply: Amount,
    /// Part of the supply moved from the owner to governance holdings.
    #[serde(default)]
    pub governance_allocation: Amount,
    #[serde(default)]
    pub params: ProtocolParams,
}

impl GenesisConfig {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            marketplace_operator: None,
            settlement_supply: 0,
            governance_allocation: 0,
            params: ProtocolParams::default(),
        }
    }

    pub fn validate(&self) -> Result<(), HarvestError> {
        self.params.validate()?;
        if self.governance_allocation > self.settlement_supply {
            return Err(HarvestError::Config(format!(
                "governance_allocation {} exceeds settlement_supply {}",
                self.governance_allocation, self.settlement_supply
            )));
        }
        Ok(())
    }
}
