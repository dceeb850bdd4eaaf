// crates/harvest-daemon/src/shared.rs
//
// DaemonSharedState: the platform, its store, and the committed-event
// channel, constructed once in main.rs and handed to the RPC server and
// background tasks.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, RwLock};

use harvest_core::events::EventRecord;
use harvest_runtime::Platform;
use harvest_store::StateStore;

/// Capacity of the committed-event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct DaemonSharedState {
    /// Single-writer runtime; writers hold the lock for one transaction.
    pub platform: Arc<RwLock<Platform>>,
    pub store: Arc<dyn StateStore>,
    /// Committed events, published after persistence.
    pub events_tx: broadcast::Sender<EventRecord>,
    /// Daemon start time for uptime calculation.
    pub start_time: Instant,
}

impl DaemonSharedState {
    pub fn new(platform: Platform, store: Arc<dyn StateStore>) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            platform: Arc::new(RwLock::new(platform)),
            store,
            events_tx,
            start_time: Instant::now(),
        }
    }
}
