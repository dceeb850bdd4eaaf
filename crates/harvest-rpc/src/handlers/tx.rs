// crates/harvest-rpc/src/handlers/tx.rs
//
// Transaction submission: SubmitTx.
//
// The write lock is held from verification through persistence. The
// prepared state is persisted first and becomes live only after the store
// accepts it, so memory never runs ahead of disk.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use harvest_core::events::EventRecord;
use harvest_core::transaction::Transaction;
use harvest_runtime::{Platform, Receipt};
use harvest_store::StateStore;

/// Request carrying one signed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTxRequest {
    pub transaction: Transaction,
}

/// Response with the commit receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTxResponse {
    pub receipt: Receipt,
}

/// Handle a SubmitTx request.
///
/// Rejected transactions, and transactions the store fails to persist,
/// leave state, nonce, and height untouched and are reported as the error
/// string of the envelope.
pub async fn handle_submit_tx(
    platform: &RwLock<Platform>,
    store: &dyn StateStore,
    events_tx: Option<&broadcast::Sender<EventRecord>>,
    request: SubmitTxRequest,
) -> Result<SubmitTxResponse, String> {
    let mut platform = platform.write().await;
    let pending = platform
        .prepare(&request.transaction)
        .map_err(|e| e.to_string())?;

    if let Err(e) = store.commit(pending.state(), &pending.receipt().events).await {
        tracing::error!(
            height = pending.receipt().height,
            "Failed to persist transaction, discarding: {}",
            e
        );
        return Err(format!("Transaction not committed: {}", e));
    }
    let receipt = platform.commit_prepared(pending);
    drop(platform);

    if let Some(tx) = events_tx {
        for record in &receipt.events {
            // No subscribers is not an error.
            let _ = tx.send(record.clone());
        }
    }

    Ok(SubmitTxResponse { receipt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use harvest_core::clock::ManualClock;
    use harvest_core::error::HarvestError;
    use harvest_core::crypto::Keypair;
    use harvest_core::identity::Role;
    use harvest_core::transaction::Call;
    use harvest_core::HarvestEvent;
    use harvest_runtime::{GenesisConfig, PlatformState};
    use harvest_store::MemoryStore;

    fn platform() -> RwLock<Platform> {
        let owner = Keypair::generate().address();
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        RwLock::new(Platform::new(&GenesisConfig::new(owner), clock).unwrap())
    }

    fn register(keypair: &Keypair, nonce: u64) -> SubmitTxRequest {
        let call = Call::Register {
            username: "alice".to_string(),
            email: "alice@farm.example".to_string(),
            role: Role::Producer,
        };
        SubmitTxRequest {
            transaction: Transaction::sign(keypair, nonce, call).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_submit_persists_and_broadcasts() {
        let platform = platform();
        let store = MemoryStore::new();
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let alice = Keypair::generate();

        let resp = handle_submit_tx(&platform, &store, Some(&events_tx), register(&alice, 0))
            .await
            .unwrap();
        assert_eq!(resp.receipt.height, 1);
        assert_eq!(resp.receipt.caller, alice.address());

        let persisted = store.load_state().await.unwrap().unwrap();
        assert_eq!(persisted.height, 1);
        assert!(persisted.registry.profile(&alice.address()).is_some());

        let record = events_rx.recv().await.unwrap();
        assert!(matches!(record.event, HarvestEvent::UserRegistered { .. }));
    }

    #[tokio::test]
    async fn test_rejected_submit_persists_nothing() {
        let platform = platform();
        let store = MemoryStore::new();
        let alice = Keypair::generate();

        let err = handle_submit_tx(&platform, &store, None, register(&alice, 5))
            .await
            .unwrap_err();
        assert!(err.to_lowercase().contains("nonce"));
        assert!(store.load_state().await.unwrap().is_none());
        assert_eq!(platform.read().await.height(), 0);
    }

    /// Store that refuses the first `failures` commits.
    struct FlakyStore {
        inner: MemoryStore,
        failures: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl StateStore for FlakyStore {
        async fn commit(&self, state: &PlatformState, events: &[EventRecord]) -> Result<(), HarvestError> {
            use std::sync::atomic::Ordering;
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(HarvestError::Storage("disk full".to_string()));
            }
            self.inner.commit(state, events).await
        }

        async fn load_state(&self) -> Result<Option<PlatformState>, HarvestError> {
            self.inner.load_state().await
        }

        async fn events_since(&self, height: u64, limit: usize) -> Result<Vec<EventRecord>, HarvestError> {
            self.inner.events_since(height, limit).await
        }
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_platform_unchanged() {
        let platform = platform();
        let store = FlakyStore {
            inner: MemoryStore::new(),
            failures: std::sync::atomic::AtomicUsize::new(1),
        };
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let alice = Keypair::generate();

        let err = handle_submit_tx(&platform, &store, Some(&events_tx), register(&alice, 0))
            .await
            .unwrap_err();
        assert!(err.contains("disk full"));
        {
            let platform = platform.read().await;
            assert_eq!(platform.height(), 0);
            assert_eq!(platform.next_nonce(&alice.address()), 0);
            assert!(platform.state().registry.profile(&alice.address()).is_none());
        }
        assert!(events_rx.try_recv().is_err());

        // The same transaction goes through once the store recovers.
        let resp = handle_submit_tx(&platform, &store, Some(&events_tx), register(&alice, 0))
            .await
            .unwrap();
        assert_eq!(resp.receipt.height, 1);
        let events = store.events_since(0, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].height, 1);
        assert_eq!(store.load_state().await.unwrap().unwrap().height, 1);
    }
}
