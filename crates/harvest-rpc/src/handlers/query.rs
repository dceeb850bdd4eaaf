// crates/harvest-rpc/src/handlers/query.rs
//
// Read-only state queries: accounts, lots, certification requests,
// protocol requests, governance, settlement token, and the event log.
//
// Every handler takes the read lock once and answers from that snapshot.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use harvest_certification::CertificationRequest;
use harvest_core::events::EventRecord;
use harvest_core::traits::{LotBook, SettlementLedger};
use harvest_core::{Address, Amount, LotId, Profile, ProposalId, ProtocolId};
use harvest_economics::GuaranteeEntry;
use harvest_governance::Proposal;
use harvest_ledger::LotMetadata;
use harvest_runtime::Platform;
use harvest_store::StateStore;

/// Default and maximum page size for `events/since`.
const DEFAULT_EVENT_LIMIT: usize = 100;
const MAX_EVENT_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRequest {
    pub account: Address,
}

/// Registration profile, nonce, and holdings of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountResponse {
    pub account: Address,
    pub profile: Option<Profile>,
    pub next_nonce: u64,
    pub token_balance: Amount,
    /// (lot id, units) pairs with non-zero balance.
    pub lots: Vec<(LotId, u64)>,
    pub dao_member: bool,
}

pub async fn handle_get_account(
    platform: &RwLock<Platform>,
    request: AccountRequest,
) -> Result<GetAccountResponse, String> {
    let platform = platform.read().await;
    let state = platform.state();
    let account = request.account;
    Ok(GetAccountResponse {
        account,
        profile: state.registry.profile(&account).cloned(),
        next_nonce: state.next_nonce(&account),
        token_balance: state.token.balance_of(&account),
        lots: state.ledger.holdings_of(&account),
        dao_member: state.governance.is_member(&account),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNonceResponse {
    pub account: Address,
    pub next_nonce: u64,
}

pub async fn handle_get_nonce(
    platform: &RwLock<Platform>,
    request: AccountRequest,
) -> Result<GetNonceResponse, String> {
    let platform = platform.read().await;
    Ok(GetNonceResponse {
        account: request.account,
        next_nonce: platform.next_nonce(&request.account),
    })
}

// ---------------------------------------------------------------------------
// Lots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotRequest {
    pub lot_id: LotId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetLotResponse {
    pub lot: LotMetadata,
    /// Units still in circulation after burns.
    pub circulating_units: u64,
}

pub async fn handle_get_lot(
    platform: &RwLock<Platform>,
    request: LotRequest,
) -> Result<GetLotResponse, String> {
    let platform = platform.read().await;
    let ledger = &platform.state().ledger;
    let lot = ledger
        .metadata(request.lot_id)
        .cloned()
        .ok_or_else(|| format!("Lot not found: {}", request.lot_id))?;
    Ok(GetLotResponse {
        circulating_units: ledger.circulating_units(request.lot_id),
        lot,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotBalanceRequest {
    pub account: Address,
    pub lot_id: LotId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotBalanceResponse {
    pub account: Address,
    pub lot_id: LotId,
    pub units: u64,
}

pub async fn handle_get_lot_balance(
    platform: &RwLock<Platform>,
    request: LotBalanceRequest,
) -> Result<LotBalanceResponse, String> {
    let platform = platform.read().await;
    Ok(LotBalanceResponse {
        units: platform.state().ledger.units_of(&request.account, request.lot_id),
        account: request.account,
        lot_id: request.lot_id,
    })
}

/// Marketplace-facing metadata document for a lot.
pub async fn handle_get_lot_metadata(
    platform: &RwLock<Platform>,
    request: LotRequest,
) -> Result<serde_json::Value, String> {
    let platform = platform.read().await;
    platform
        .state()
        .ledger
        .metadata_document(request.lot_id)
        .ok_or_else(|| format!("Lot not found: {}", request.lot_id))
}

// ---------------------------------------------------------------------------
// Certification and protocol requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCertificationResponse {
    pub lot_id: LotId,
    pub certified: bool,
    /// The open request, if any.
    pub request: Option<CertificationRequest>,
}

pub async fn handle_get_certification(
    platform: &RwLock<Platform>,
    request: LotRequest,
) -> Result<GetCertificationResponse, String> {
    let platform = platform.read().await;
    let state = platform.state();
    if !state.ledger.lot_exists(request.lot_id) {
        return Err(format!("Lot not found: {}", request.lot_id));
    }
    Ok(GetCertificationResponse {
        lot_id: request.lot_id,
        certified: state.ledger.is_certified(request.lot_id),
        request: state.certification.request(request.lot_id).cloned(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerRequest {
    pub producer: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedProtocolsResponse {
    pub producer: Address,
    pub protocol_ids: Vec<ProtocolId>,
}

pub async fn handle_get_requested_protocols(
    platform: &RwLock<Platform>,
    request: ProducerRequest,
) -> Result<RequestedProtocolsResponse, String> {
    let platform = platform.read().await;
    Ok(RequestedProtocolsResponse {
        protocol_ids: platform.state().protocols.requested_by(&request.producer),
        producer: request.producer,
    })
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub proposal_id: ProposalId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProposalResponse {
    pub proposal: Proposal,
    /// Lifecycle status evaluated at the node's current time.
    pub status: String,
}

pub async fn handle_get_proposal(
    platform: &RwLock<Platform>,
    request: ProposalRequest,
) -> Result<GetProposalResponse, String> {
    let platform = platform.read().await;
    let now = platform.now();
    let proposal = platform
        .state()
        .governance
        .proposal(request.proposal_id)
        .cloned()
        .ok_or_else(|| format!("Proposal not found: {}", request.proposal_id))?;
    Ok(GetProposalResponse {
        status: proposal.status(now).to_string(),
        proposal,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProposalsRequest {
    /// Only return proposals in this status.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProposalsResponse {
    pub proposals: Vec<GetProposalResponse>,
    pub total: u64,
}

pub async fn handle_list_proposals(
    platform: &RwLock<Platform>,
    request: ListProposalsRequest,
) -> Result<ListProposalsResponse, String> {
    let platform = platform.read().await;
    let now = platform.now();
    let governance = &platform.state().governance;
    let proposals = governance
        .proposals()
        .iter()
        .map(|p| GetProposalResponse {
            status: p.status(now).to_string(),
            proposal: p.clone(),
        })
        .filter(|p| request.status.as_deref().map_or(true, |s| p.status == s))
        .collect();
    Ok(ListProposalsResponse {
        proposals,
        total: governance.proposal_count(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMemberResponse {
    pub account: Address,
    pub is_member: bool,
    pub member_count: usize,
}

pub async fn handle_get_member(
    platform: &RwLock<Platform>,
    request: AccountRequest,
) -> Result<GetMemberResponse, String> {
    let platform = platform.read().await;
    let governance = &platform.state().governance;
    Ok(GetMemberResponse {
        account: request.account,
        is_member: governance.is_member(&request.account),
        member_count: governance.members().len(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCreditedResponse {
    pub producer: Address,
    pub credited: Amount,
}

pub async fn handle_get_credited(
    platform: &RwLock<Platform>,
    request: ProducerRequest,
) -> Result<GetCreditedResponse, String> {
    let platform = platform.read().await;
    Ok(GetCreditedResponse {
        credited: platform.state().governance.credited_balance(&request.producer),
        producer: request.producer,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuaranteeRequest {
    pub inspector: Address,
    pub proposal_id: ProposalId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGuaranteeResponse {
    pub inspector: Address,
    pub proposal_id: ProposalId,
    /// Currently locked amount (zero once refunded or forfeited).
    pub guaranteed_amount: Amount,
    pub entry: Option<GuaranteeEntry>,
}

pub async fn handle_get_guarantee(
    platform: &RwLock<Platform>,
    request: GuaranteeRequest,
) -> Result<GetGuaranteeResponse, String> {
    let platform = platform.read().await;
    let governance = &platform.state().governance;
    Ok(GetGuaranteeResponse {
        guaranteed_amount: governance.guaranteed_amount(&request.inspector, request.proposal_id),
        entry: governance
            .guarantees()
            .entry(&request.inspector, request.proposal_id)
            .cloned(),
        inspector: request.inspector,
        proposal_id: request.proposal_id,
    })
}

// ---------------------------------------------------------------------------
// Settlement token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalanceResponse {
    pub account: Address,
    pub balance: Amount,
}

pub async fn handle_get_token_balance(
    platform: &RwLock<Platform>,
    request: AccountRequest,
) -> Result<TokenBalanceResponse, String> {
    let platform = platform.read().await;
    Ok(TokenBalanceResponse {
        balance: platform.state().token.balance_of(&request.account),
        account: request.account,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRequest {
    pub owner: Address,
    pub spender: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    pub allowance: Amount,
}

pub async fn handle_get_allowance(
    platform: &RwLock<Platform>,
    request: AllowanceRequest,
) -> Result<AllowanceResponse, String> {
    let platform = platform.read().await;
    Ok(AllowanceResponse {
        allowance: platform
            .state()
            .token
            .allowance(&request.owner, &request.spender),
        owner: request.owner,
        spender: request.spender,
    })
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsSinceRequest {
    /// Return events committed strictly above this height.
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsSinceResponse {
    pub events: Vec<EventRecord>,
    /// Height of the last returned event, or the request height if none.
    pub last_height: u64,
}

pub async fn handle_events_since(
    store: &dyn StateStore,
    request: EventsSinceRequest,
) -> Result<EventsSinceResponse, String> {
    let limit = request
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);
    let events = store
        .events_since(request.height, limit)
        .await
        .map_err(|e| e.to_string())?;
    let last_height = events.last().map_or(request.height, |r| r.height);
    Ok(EventsSinceResponse {
        events,
        last_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use harvest_core::clock::ManualClock;
    use harvest_core::identity::Role;
    use harvest_core::transaction::Call;
    use harvest_runtime::GenesisConfig;
    use harvest_store::MemoryStore;

    struct Fixture {
        platform: RwLock<Platform>,
        owner: Address,
        producer: Address,
    }

    fn fixture() -> Fixture {
        let owner = Address([1u8; 20]);
        let producer = Address([2u8; 20]);
        let mut genesis = GenesisConfig::new(owner);
        genesis.settlement_supply = 500;
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let mut platform = Platform::new(&genesis, clock).unwrap();
        platform
            .execute(
                &producer,
                &Call::Register {
                    username: "bob".to_string(),
                    email: "bob@farm.example".to_string(),
                    role: Role::Producer,
                },
            )
            .unwrap();
        platform
            .execute(
                &producer,
                &Call::MintLot {
                    total_units: 40,
                    name: "Winter wheat".to_string(),
                    units_per_token: 10,
                },
            )
            .unwrap();
        Fixture {
            platform: RwLock::new(platform),
            owner,
            producer,
        }
    }

    #[tokio::test]
    async fn test_get_account() {
        let f = fixture();
        let resp = handle_get_account(&f.platform, AccountRequest { account: f.producer })
            .await
            .unwrap();
        assert_eq!(resp.profile.unwrap().role, Role::Producer);
        assert_eq!(resp.lots, vec![(0, 40)]);
        assert_eq!(resp.next_nonce, 0);
        assert!(!resp.dao_member);

        let owner = handle_get_token_balance(&f.platform, AccountRequest { account: f.owner })
            .await
            .unwrap();
        assert_eq!(owner.balance, 500);
    }

    #[tokio::test]
    async fn test_get_lot_and_certification() {
        let f = fixture();
        let lot = handle_get_lot(&f.platform, LotRequest { lot_id: 0 })
            .await
            .unwrap();
        assert_eq!(lot.lot.name, "Winter wheat");
        assert_eq!(lot.circulating_units, 40);

        let cert = handle_get_certification(&f.platform, LotRequest { lot_id: 0 })
            .await
            .unwrap();
        assert!(!cert.certified);
        assert!(cert.request.is_none());

        assert!(handle_get_lot(&f.platform, LotRequest { lot_id: 9 })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_list_proposals_empty() {
        let f = fixture();
        let resp = handle_list_proposals(&f.platform, ListProposalsRequest::default())
            .await
            .unwrap();
        assert!(resp.proposals.is_empty());
        assert_eq!(resp.total, 0);
        assert!(handle_get_proposal(&f.platform, ProposalRequest { proposal_id: 0 })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_events_since_defaults() {
        let store = MemoryStore::new();
        let resp = handle_events_since(
            &store,
            EventsSinceRequest {
                height: 4,
                limit: None,
            },
        )
        .await
        .unwrap();
        assert!(resp.events.is_empty());
        assert_eq!(resp.last_height, 4);
    }
}
