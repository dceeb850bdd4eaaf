// crates/harvest-core/src/lib.rs
//
// harvest-core: Core types, traits, and crypto primitives for the Harvest Protocol.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines account addresses, roles, the error taxonomy, emitted events,
// the signed transaction envelope, and the interfaces components use to
// call into each other without sharing state.

pub mod address;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod events;
pub mod identity;
pub mod params;
pub mod traits;
pub mod transaction;

/// Identifier of a harvest lot (semi-fungible token id).
pub type LotId = u64;

/// Index of a governance proposal.
pub type ProposalId = u64;

/// Identifier of a protocol a producer asks the DAO to govern.
pub type ProtocolId = u64;

/// Settlement-token amount in base units.
pub type Amount = u64;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use harvest_core::Address;`

pub use address::Address;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::HarvestError;
pub use events::{EventRecord, HarvestEvent};
pub use identity::{Profile, Role};
pub use params::ProtocolParams;
pub use traits::{LotBook, ProtocolBook, RoleDirectory, SettlementLedger};
pub use transaction::{Call, Transaction};
