// crates/harvest-runtime/src/lib.rs
//
// harvest-runtime: applies calls to the platform state one at a time.
//
// Every call runs against a copy of the state. The copy replaces the live
// state only when the call and all of its nested cross-component calls
// succeed, so a failed call leaves no trace and emits no events.

pub mod desk;
pub mod genesis;
pub mod platform;
pub mod state;

pub use desk::{InspectorDesk, DESK_LABEL};
pub use genesis::GenesisConfig;
pub use platform::{PendingCommit, Platform, Receipt};
pub use state::PlatformState;
