// crates/harvest-governance/src/lib.rs
//
// harvest-governance: the DAO operation center.
//
// Inspectors granted membership by the owner create proposals for
// producers with an open protocol request, vote within a fixed window,
// and execute passing proposals to credit the producer with settlement
// tokens. A passed proposal then gets a staked process inspection whose
// outcome refunds or forfeits the stake. Sales reported by the marketplace
// operator are reconciled against the producer's credit.

pub mod center;
pub mod membership;
pub mod proposal;

pub use center::{GovernanceCenter, GOVERNANCE_LABEL};
pub use membership::DaoMembership;
pub use proposal::Proposal;
