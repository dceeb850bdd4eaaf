// crates/harvest-ledger/src/lib.rs
//
// harvest-ledger: the two leaf components of the Harvest Protocol.
//
//   - `registry`: who an address is (role and profile), registered once.
//   - `lots`: semi-fungible harvest lots, per-holder unit balances, and the
//     certification flag the certification workflow flips.

pub mod lots;
pub mod registry;

pub use lots::{HarvestLedger, LotMetadata};
pub use registry::IdentityRegistry;
