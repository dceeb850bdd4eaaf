// crates/harvest-core/src/params.rs
//
// Protocol parameters fixed at genesis.
//
//   - Voting window: 3 days between proposal creation and deadline.
//   - Inspector fee: 5 settlement units paid on a passed process inspection.
//   - Producer fee percentage: 20% withheld from each sale before the
//     producer share is reconciled against credit.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::HarvestError;
use crate::Amount;

/// Default voting window in seconds (3 days).
pub const DEFAULT_VOTING_WINDOW_SECS: u64 = 3 * 24 * 60 * 60;

/// Longest accepted voting window in seconds (10 years).
pub const MAX_VOTING_WINDOW_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Default fee paid to an inspector when a process inspection passes.
pub const DEFAULT_INSPECTOR_FEE: Amount = 5;

/// Default percentage of a sale withheld from the producer share.
pub const DEFAULT_PRODUCER_FEE_PERCENTAGE: u8 = 20;

/// Genesis-time protocol constants. Not mutable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    #[serde(default = "default_voting_window_secs")]
    pub voting_window_secs: u64,

    #[serde(default = "default_inspector_fee")]
    pub inspector_fee: Amount,

    #[serde(default = "default_producer_fee_percentage")]
    pub producer_fee_percentage: u8,
}

fn default_voting_window_secs() -> u64 {
    DEFAULT_VOTING_WINDOW_SECS
}

fn default_inspector_fee() -> Amount {
    DEFAULT_INSPECTOR_FEE
}

fn default_producer_fee_percentage() -> u8 {
    DEFAULT_PRODUCER_FEE_PERCENTAGE
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            voting_window_secs: default_voting_window_secs(),
            inspector_fee: default_inspector_fee(),
            producer_fee_percentage: default_producer_fee_percentage(),
        }
    }
}

impl ProtocolParams {
    /// The voting window as a chrono duration. Saturates at
    /// `Duration::MAX` for windows chrono cannot represent.
    pub fn voting_window(&self) -> Duration {
        i64::try_from(self.voting_window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Reject parameter sets that would make the protocol misbehave.
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.producer_fee_percentage > 100 {
            return Err(HarvestError::Config(format!(
                "producer_fee_percentage must be <= 100, got {}",
                self.producer_fee_percentage
            )));
        }
        if self.voting_window_secs == 0 || self.voting_window_secs > MAX_VOTING_WINDOW_SECS {
            return Err(HarvestError::Config(format!(
                "voting_window_secs out of range: {}",
                self.voting_window_secs
            )));
        }
        Ok(())
    }
}
