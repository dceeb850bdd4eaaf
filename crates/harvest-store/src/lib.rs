// crates/harvest-store/src/lib.rs
//
// harvest-store: persistence for the Harvest Protocol.
//
// The platform state is stored as a single JSON snapshot, rewritten after
// every commit together with the committed events, so a restart resumes
// at the last committed height.

pub mod memory;
pub mod rocks;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use traits::StateStore;
