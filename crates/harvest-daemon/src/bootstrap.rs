// crates/harvest-daemon/src/bootstrap.rs
//
// Startup: restore the persisted snapshot, or build genesis state from
// the config and persist it so a restart never re-runs genesis.

use std::sync::Arc;

use harvest_core::clock::Clock;
use harvest_core::error::HarvestError;
use harvest_runtime::Platform;
use harvest_store::StateStore;

use crate::config::DaemonConfig;

pub async fn restore_or_genesis(
    store: &dyn StateStore,
    config: &DaemonConfig,
    clock: Arc<dyn Clock>,
) -> Result<Platform, HarvestError> {
    if let Some(state) = store.load_state().await? {
        tracing::info!(height = state.height, "Restored platform snapshot");
        return Ok(Platform::from_state(state, clock));
    }

    let genesis = config.genesis()?;
    tracing::info!(
        owner = %genesis.owner,
        supply = genesis.settlement_supply,
        allocation = genesis.governance_allocation,
        "No snapshot found, starting from genesis"
    );
    let platform = Platform::new(&genesis, clock)?;
    store.commit(platform.state(), &[]).await?;
    Ok(platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::clock::SystemClock;
    use harvest_core::Address;
    use harvest_store::MemoryStore;

    fn config() -> DaemonConfig {
        DaemonConfig {
            owner: Some(Address([4u8; 20])),
            settlement_supply: 900,
            ..DaemonConfig::default()
        }
    }

    #[tokio::test]
    async fn test_genesis_is_persisted() {
        let store = MemoryStore::new();
        let platform = restore_or_genesis(&store, &config(), Arc::new(SystemClock))
            .await
            .unwrap();
        assert_eq!(platform.height(), 0);
        assert!(store.load_state().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_snapshot_wins_over_config() {
        let store = MemoryStore::new();
        let mut platform = restore_or_genesis(&store, &config(), Arc::new(SystemClock))
            .await
            .unwrap();
        let receipt = platform
            .execute(
                &Address([4u8; 20]),
                &harvest_core::Call::TransferToken {
                    to: Address([5u8; 20]),
                    amount: 100,
                },
            )
            .unwrap();
        store.commit(platform.state(), &receipt.events).await.unwrap();

        // Config without an owner still boots from the snapshot.
        let restored = restore_or_genesis(&store, &DaemonConfig::default(), Arc::new(SystemClock))
            .await
            .unwrap();
        assert_eq!(restored.height(), 1);
    }

    #[tokio::test]
    async fn test_missing_owner_without_snapshot() {
        let store = MemoryStore::new();
        let result =
            restore_or_genesis(&store, &DaemonConfig::default(), Arc::new(SystemClock)).await;
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }
}
