// crates/harvest-rpc/src/handlers/node.rs
//
// Node info and health handlers: GetNodeInfo, GetHealth.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use harvest_core::{Address, Amount, ProtocolParams, SettlementLedger};
use harvest_runtime::{InspectorDesk, Platform};
use harvest_store::StateStore;

// ---------------------------------------------------------------------------
// GetNodeInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetNodeInfoRequest {}

/// Static configuration and aggregate counters of the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoResponse {
    pub version: String,
    pub uptime_seconds: u64,
    pub height: u64,
    pub owner: Address,
    pub marketplace_operator: Address,
    /// Address holding governance funds.
    pub governance_address: Address,
    pub governance_holdings: Amount,
    /// Spender inspectors approve before taking an assignment.
    pub desk_address: Address,
    pub params: ProtocolParams,
    pub registered_accounts: usize,
    pub lot_count: u64,
    pub proposal_count: u64,
    pub dao_members: usize,
    pub open_certification_requests: usize,
}

pub async fn handle_get_node_info(
    platform: &RwLock<Platform>,
    start_time: Option<Instant>,
    _request: GetNodeInfoRequest,
) -> Result<GetNodeInfoResponse, String> {
    let platform = platform.read().await;
    let state = platform.state();
    let governance = &state.governance;
    Ok(GetNodeInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.map_or(0, |t| t.elapsed().as_secs()),
        height: state.height,
        owner: governance.owner(),
        marketplace_operator: governance.marketplace_operator(),
        governance_address: governance.holdings_address(),
        governance_holdings: state.token.balance_of(&governance.holdings_address()),
        desk_address: InspectorDesk::address(),
        params: governance.params().clone(),
        registered_accounts: state.registry.registered_count(),
        lot_count: state.ledger.lot_count(),
        proposal_count: governance.proposal_count(),
        dao_members: governance.members().len(),
        open_certification_requests: state.certification.open_count(),
    })
}

// ---------------------------------------------------------------------------
// GetHealth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetHealthRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    /// "healthy" or "degraded".
    pub status: String,
    pub storage_ok: bool,
    pub height: u64,
    /// Height of the last persisted snapshot, if any.
    pub persisted_height: Option<u64>,
    pub details: Option<String>,
}

/// Handle a GetHealth request.
///
/// Storage is healthy when the snapshot can be read back and is not
/// behind the in-memory height.
pub async fn handle_get_health(
    platform: &RwLock<Platform>,
    store: &dyn StateStore,
    _request: GetHealthRequest,
) -> Result<GetHealthResponse, String> {
    let height = platform.read().await.height();
    let (storage_ok, persisted_height, details) = match store.load_state().await {
        Ok(Some(snapshot)) if snapshot.height >= height => (true, Some(snapshot.height), None),
        Ok(Some(snapshot)) => (
            false,
            Some(snapshot.height),
            Some(format!(
                "Snapshot at height {} is behind committed height {}",
                snapshot.height, height
            )),
        ),
        // Nothing committed yet.
        Ok(None) if height == 0 => (true, None, None),
        Ok(None) => (false, None, Some("No snapshot persisted".to_string())),
        Err(e) => (false, None, Some(e.to_string())),
    };

    Ok(GetHealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        storage_ok,
        height,
        persisted_height,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use harvest_core::clock::ManualClock;
    use harvest_runtime::GenesisConfig;
    use harvest_store::MemoryStore;

    fn platform() -> RwLock<Platform> {
        let mut genesis = GenesisConfig::new(Address([7u8; 20]));
        genesis.settlement_supply = 100;
        genesis.governance_allocation = 40;
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        RwLock::new(Platform::new(&genesis, clock).unwrap())
    }

    #[tokio::test]
    async fn test_node_info_reports_genesis() {
        let platform = platform();
        let info = handle_get_node_info(&platform, None, GetNodeInfoRequest {})
            .await
            .unwrap();
        assert_eq!(info.height, 0);
        assert_eq!(info.owner, Address([7u8; 20]));
        assert_eq!(info.governance_holdings, 40);
        assert_eq!(info.desk_address, InspectorDesk::address());
        assert_eq!(info.uptime_seconds, 0);
    }

    #[tokio::test]
    async fn test_health_fresh_node() {
        let platform = platform();
        let store = MemoryStore::new();
        let health = handle_get_health(&platform, &store, GetHealthRequest {})
            .await
            .unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.persisted_height.is_none());
    }
}
