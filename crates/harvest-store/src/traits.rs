// crates/harvest-store/src/traits.rs

use async_trait::async_trait;

use harvest_core::error::HarvestError;
use harvest_core::events::EventRecord;
use harvest_runtime::PlatformState;

/// Persistent platform state and event log.
///
/// Implemented by `RocksStore` (RocksDB) and `MemoryStore` (tests).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist the post-commit state and the events of that commit in one
    /// atomic write.
    async fn commit(&self, state: &PlatformState, events: &[EventRecord]) -> Result<(), HarvestError>;

    /// Latest persisted state, `None` for a fresh store.
    async fn load_state(&self) -> Result<Option<PlatformState>, HarvestError>;

    /// Events committed at heights strictly greater than `height`, oldest
    /// first, at most `limit` of them.
    async fn events_since(&self, height: u64, limit: usize) -> Result<Vec<EventRecord>, HarvestError>;
}
