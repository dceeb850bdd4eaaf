// crates/harvest-store/src/rocks.rs
//
// RocksDB-backed persistence for the platform state and event log.
//
// Key format:
//   - `snapshot`                       -> JSON-serialized PlatformState
//   - `event:{height:020}:{index:04}`  -> JSON-serialized EventRecord
//
// Zero-padded heights keep event keys in commit order, so `events_since`
// is a single forward scan from the first key above the given height.

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options, WriteBatch};
use tracing::debug;

use harvest_core::error::HarvestError;
use harvest_core::events::EventRecord;
use harvest_runtime::PlatformState;

use crate::traits::StateStore;

const SNAPSHOT_KEY: &[u8] = b"snapshot";
const EVENT_PREFIX: &[u8] = b"event:";

/// RocksDB wrapper implementing the `StateStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, HarvestError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| HarvestError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self { db })
    }

    /// Build an event key: `event:{height:020}:{index:04}`.
    fn event_key(height: u64, index: u32) -> Vec<u8> {
        format!("event:{:020}:{:04}", height, index).into_bytes()
    }

    /// Get raw bytes from RocksDB, mapping errors to HarvestError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HarvestError> {
        self.db
            .get(key)
            .map_err(|e| HarvestError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Synchronous commit used by the async trait impl.
    pub fn commit_sync(&self, state: &PlatformState, events: &[EventRecord]) -> Result<(), HarvestError> {
        let mut batch = WriteBatch::default();
        batch.put(SNAPSHOT_KEY, serde_json::to_vec(state)?);
        for record in events {
            batch.put(
                Self::event_key(record.height, record.index),
                serde_json::to_vec(record)?,
            );
        }
        self.db
            .write(batch)
            .map_err(|e| HarvestError::Storage(format!("RocksDB write failed: {}", e)))?;
        debug!(height = state.height, events = events.len(), "Persisted commit");
        Ok(())
    }

    pub fn load_state_sync(&self) -> Result<Option<PlatformState>, HarvestError> {
        match self.get_raw(SNAPSHOT_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn events_since_sync(&self, height: u64, limit: usize) -> Result<Vec<EventRecord>, HarvestError> {
        let start = Self::event_key(height.saturating_add(1), 0);
        let mut events = Vec::new();

        let iter = self
            .db
            .iterator(IteratorMode::From(start.as_slice(), Direction::Forward));
        for item in iter {
            if events.len() >= limit {
                break;
            }
            let (key, value) = item
                .map_err(|e| HarvestError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(EVENT_PREFIX) {
                break;
            }
            events.push(serde_json::from_slice(&value)?);
        }

        Ok(events)
    }
}

#[async_trait]
impl StateStore for RocksStore {
    async fn commit(&self, state: &PlatformState, events: &[EventRecord]) -> Result<(), HarvestError> {
        self.commit_sync(state, events)
    }

    async fn load_state(&self) -> Result<Option<PlatformState>, HarvestError> {
        self.load_state_sync()
    }

    async fn events_since(&self, height: u64, limit: usize) -> Result<Vec<EventRecord>, HarvestError> {
        self.events_since_sync(height, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use harvest_core::{Address, HarvestEvent};
    use harvest_runtime::GenesisConfig;
    use uuid::Uuid;

    fn temp_path() -> String {
        std::env::temp_dir()
            .join(format!("harvest-store-{}", Uuid::now_v7()))
            .display()
            .to_string()
    }

    fn record(height: u64, index: u32) -> EventRecord {
        EventRecord {
            height,
            index,
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event: HarvestEvent::NewMemberAdded {
                member: Address([height as u8; 20]),
            },
        }
    }

    #[test]
    fn test_event_key_ordering() {
        assert!(RocksStore::event_key(2, 0) < RocksStore::event_key(10, 0));
        assert!(RocksStore::event_key(10, 1) < RocksStore::event_key(10, 2));
        assert_eq!(
            RocksStore::event_key(7, 3),
            b"event:00000000000000000007:0003".to_vec()
        );
    }

    #[tokio::test]
    async fn test_commit_and_reload() {
        let path = temp_path();
        let owner = Address([1u8; 20]);
        let mut state = PlatformState::genesis(&GenesisConfig::new(owner)).unwrap();
        state.height = 3;

        {
            let store = RocksStore::open(&path).unwrap();
            assert!(store.load_state().await.unwrap().is_none());
            store.commit(&state, &[record(3, 0)]).await.unwrap();
        }

        let store = RocksStore::open(&path).unwrap();
        let loaded = store.load_state().await.unwrap().unwrap();
        assert_eq!(loaded.height, 3);
        assert_eq!(loaded.governance.owner(), owner);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_events_since() {
        let path = temp_path();
        let store = RocksStore::open(&path).unwrap();
        let state = PlatformState::genesis(&GenesisConfig::new(Address([1u8; 20]))).unwrap();

        store.commit(&state, &[record(1, 0)]).await.unwrap();
        store.commit(&state, &[record(2, 0), record(2, 1)]).await.unwrap();
        store.commit(&state, &[record(10, 0)]).await.unwrap();

        let all = store.events_since(0, 100).await.unwrap();
        let positions: Vec<(u64, u32)> = all.iter().map(|r| (r.height, r.index)).collect();
        assert_eq!(positions, vec![(1, 0), (2, 0), (2, 1), (10, 0)]);

        let after_two = store.events_since(2, 100).await.unwrap();
        assert_eq!(after_two.len(), 1);
        assert_eq!(after_two[0].height, 10);

        let limited = store.events_since(0, 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }
}
