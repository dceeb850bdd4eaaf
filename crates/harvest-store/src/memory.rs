// crates/harvest-store/src/memory.rs
//
// In-memory StateStore for tests and ephemeral nodes (`--ephemeral`).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use harvest_core::error::HarvestError;
use harvest_core::events::EventRecord;
use harvest_runtime::PlatformState;

use crate::traits::StateStore;

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Option<PlatformState>>,
    /// (height, index) -> record.
    events: RwLock<BTreeMap<(u64, u32), EventRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn commit(&self, state: &PlatformState, events: &[EventRecord]) -> Result<(), HarvestError> {
        let mut log = self.events.write().await;
        for record in events {
            log.insert((record.height, record.index), record.clone());
        }
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    async fn load_state(&self) -> Result<Option<PlatformState>, HarvestError> {
        Ok(self.state.read().await.clone())
    }

    async fn events_since(&self, height: u64, limit: usize) -> Result<Vec<EventRecord>, HarvestError> {
        let log = self.events.read().await;
        Ok(log
            .range((height.saturating_add(1), 0)..)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
