// crates/harvest-economics/src/lib.rs
//
// harvest-economics: settlement-token accounting for the Harvest Protocol.
//
// All amounts are integer base units of the settlement token. Governance
// holdings are simply the token balance of the governance system address.

pub mod fees;
pub mod guarantee;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use fees::{producer_share, reconcile_purchase, Reconciliation};
pub use guarantee::{GuaranteeEntry, GuaranteeEscrow, GuaranteeStatus};
pub use token::SettlementToken;
