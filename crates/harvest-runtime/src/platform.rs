// crates/harvest-runtime/src/platform.rs
//
// Platform: the single writer over `PlatformState`.
//
// Every call is applied to a clone of the state. `prepare` stops there so
// the caller can persist the clone first; `commit_prepared` swaps it in.
// Height and, for signed transactions, the signer nonce advance only on
// commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use harvest_core::clock::Clock;
use harvest_core::error::HarvestError;
use harvest_core::events::{EventRecord, HarvestEvent};
use harvest_core::traits::SettlementLedger;
use harvest_core::transaction::{Call, Transaction};
use harvest_core::Address;

use crate::desk::InspectorDesk;
use crate::genesis::GenesisConfig;
use crate::state::PlatformState;

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: Uuid,
    pub height: u64,
    pub caller: Address,
    /// Call name, e.g. `mint_lot`.
    pub call: String,
    pub timestamp: DateTime<Utc>,
    pub events: Vec<EventRecord>,
}

/// A transaction applied to a copy of the state, not yet live.
#[derive(Debug, Clone)]
pub struct PendingCommit {
    state: PlatformState,
    receipt: Receipt,
}

impl PendingCommit {
    /// The state as it will be after commit.
    pub fn state(&self) -> &PlatformState {
        &self.state
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }
}

pub struct Platform {
    state: PlatformState,
    clock: Arc<dyn Clock>,
}

impl Platform {
    /// Start from genesis.
    pub fn new(genesis: &GenesisConfig, clock: Arc<dyn Clock>) -> Result<Self, HarvestError> {
        let state = PlatformState::genesis(genesis)?;
        info!(
            owner = %genesis.owner,
            supply = genesis.settlement_supply,
            "Platform initialized from genesis"
        );
        Ok(Self { state, clock })
    }

    /// Resume from a persisted state.
    pub fn from_state(state: PlatformState, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    pub fn state(&self) -> &PlatformState {
        &self.state
    }

    pub fn height(&self) -> u64 {
        self.state.height
    }

    pub fn next_nonce(&self, account: &Address) -> u64 {
        self.state.next_nonce(account)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Verify and apply a signed transaction.
    ///
    /// # Errors
    /// - `InvalidSignature` if the signature does not match the signer.
    /// - `InvalidNonce` unless `tx.nonce` is the signer's next nonce.
    /// - Any error of the call itself.
    pub fn submit(&mut self, tx: &Transaction) -> Result<Receipt, HarvestError> {
        let pending = self.prepare(tx)?;
        Ok(self.commit_prepared(pending))
    }

    /// Verify and apply a signed transaction to a copy of the state
    /// without committing it.
    ///
    /// The live state is untouched until the result is passed to
    /// `commit_prepared`. Dropping it discards the transaction.
    pub fn prepare(&self, tx: &Transaction) -> Result<PendingCommit, HarvestError> {
        let caller = tx.verify().inspect_err(|e| {
            warn!(call = tx.call.name(), error = %e, "Rejected transaction");
        })?;

        let expected = self.state.next_nonce(&caller);
        if tx.nonce != expected {
            warn!(%caller, expected, got = tx.nonce, "Rejected transaction: bad nonce");
            return Err(HarvestError::InvalidNonce {
                expected,
                got: tx.nonce,
            });
        }

        self.draft(caller, &tx.call, true)
    }

    /// Apply a call on behalf of `caller` without a signature or nonce.
    ///
    /// For in-process callers that already authenticated the caller.
    pub fn execute(&mut self, caller: &Address, call: &Call) -> Result<Receipt, HarvestError> {
        let pending = self.draft(*caller, call, false)?;
        Ok(self.commit_prepared(pending))
    }

    /// Swap a prepared state in as the live state.
    pub fn commit_prepared(&mut self, pending: PendingCommit) -> Receipt {
        let PendingCommit { state, receipt } = pending;
        self.state = state;
        info!(
            caller = %receipt.caller,
            call = %receipt.call,
            height = receipt.height,
            events = receipt.events.len(),
            "Transaction committed"
        );
        receipt
    }

    fn draft(&self, caller: Address, call: &Call, bump_nonce: bool) -> Result<PendingCommit, HarvestError> {
        let now = self.clock.now();
        let mut draft = self.state.clone();

        let events = match apply(&mut draft, &caller, call, now) {
            Ok(events) => events,
            Err(e) => {
                warn!(%caller, call = call.name(), error = %e, "Transaction reverted");
                return Err(e);
            }
        };

        if bump_nonce {
            *draft.nonces.entry(caller).or_insert(0) += 1;
        }
        draft.height += 1;

        let height = draft.height;
        let tx_id = Uuid::now_v7();
        let events: Vec<EventRecord> = events
            .into_iter()
            .enumerate()
            .map(|(index, event)| EventRecord {
                height,
                index: index as u32,
                tx_id,
                timestamp: now,
                event,
            })
            .collect();

        Ok(PendingCommit {
            state: draft,
            receipt: Receipt {
                tx_id,
                height,
                caller,
                call: call.name().to_string(),
                timestamp: now,
                events,
            },
        })
    }
}

/// Route a call to its component. Runs against the draft state.
fn apply(
    state: &mut PlatformState,
    caller: &Address,
    call: &Call,
    now: DateTime<Utc>,
) -> Result<Vec<HarvestEvent>, HarvestError> {
    let event = match call {
        Call::Register {
            username,
            email,
            role,
        } => state.registry.register(caller, username, email, *role, now)?,
        Call::MintLot {
            total_units,
            name,
            units_per_token,
        } => state
            .ledger
            .mint(&state.registry, caller, *total_units, name, *units_per_token, now)?,
        Call::BurnLot { lot_id, amount } => {
            state.ledger.burn(&state.registry, caller, *lot_id, *amount)?
        }
        Call::RequestCertification { lot_id } => state.certification.request_certification(
            &state.registry,
            &state.ledger,
            caller,
            *lot_id,
            now,
        )?,
        Call::AcceptCertificationRequest { lot_id } => state
            .certification
            .accept_certification_request(&state.registry, caller, *lot_id)?,
        Call::ApproveCertification { lot_id } => state.certification.approve_certification(
            &state.registry,
            &mut state.ledger,
            caller,
            *lot_id,
        )?,
        Call::RejectCertification { lot_id } => state
            .certification
            .reject_certification(&state.registry, caller, *lot_id)?,
        Call::RequestProtocolWithDao { protocol_id } => state
            .protocols
            .request_protocol_with_dao(&state.registry, caller, *protocol_id)?,
        Call::AddMember { account } => state.governance.add_member(&state.registry, caller, account)?,
        Call::RemoveMember { account } => state.governance.remove_member(caller, account)?,
        Call::CreateProposal {
            description,
            protocol_id,
            producer,
        } => state.governance.create_proposal(
            &state.protocols,
            caller,
            description,
            *protocol_id,
            producer,
            now,
        )?,
        Call::Vote {
            proposal_id,
            support,
        } => state.governance.vote(caller, *proposal_id, *support, now)?,
        Call::ExecuteProposal {
            proposal_id,
            credit_amount,
        } => {
            return state.governance.execute_proposal(
                &mut state.protocols,
                &mut state.token,
                caller,
                *proposal_id,
                *credit_amount,
                now,
            )
        }
        Call::AssignInspectorToProposal {
            proposal_id,
            guaranteed_amount,
        } => {
            return InspectorDesk::assign_inspector_to_proposal(
                state,
                caller,
                *proposal_id,
                *guaranteed_amount,
                now,
            )
        }
        Call::ApproveProcessInspection { proposal_id } => {
            return InspectorDesk::approve_process_inspection(state, caller, *proposal_id)
        }
        Call::FailProcessInspection { proposal_id } => {
            return InspectorDesk::fail_process_inspection(state, caller, *proposal_id)
        }
        Call::WithdrawSettlementToken { amount } => state
            .governance
            .withdraw_settlement_token(&mut state.token, caller, *amount)?,
        Call::HandlePurchase {
            producer,
            total_price,
        } => {
            return state
                .governance
                .handle_purchase(&mut state.token, caller, producer, *total_price)
        }
        Call::TransferToken { to, amount } => state.token.transfer(caller, to, *amount)?,
        Call::ApproveToken { spender, amount } => state.token.approve(caller, spender, *amount),
    };
    Ok(vec![event])
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::crypto::Keypair;
    use harvest_core::identity::Role;
    use harvest_core::traits::LotBook;
    use harvest_core::ManualClock;

    fn platform(owner: Address) -> Platform {
        let mut genesis = GenesisConfig::new(owner);
        genesis.settlement_supply = 1_000;
        Platform::new(&genesis, Arc::new(ManualClock::new(Utc::now()))).unwrap()
    }

    fn register(role: Role) -> Call {
        Call::Register {
            username: "user".to_string(),
            email: "user@farm.io".to_string(),
            role,
        }
    }

    #[test]
    fn test_commit_advances_height_and_records_events() {
        let producer = Address([1u8; 20]);
        let mut platform = platform(Address([9u8; 20]));

        let receipt = platform.execute(&producer, &register(Role::Producer)).unwrap();
        assert_eq!(receipt.height, 1);
        assert_eq!(receipt.call, "register");
        assert_eq!(receipt.events.len(), 1);
        assert_eq!(receipt.events[0].height, 1);
        assert_eq!(receipt.events[0].index, 0);
        assert_eq!(platform.height(), 1);
    }

    #[test]
    fn test_prepared_transaction_is_not_live_until_committed() {
        let producer = Keypair::generate();
        let mut platform = platform(Address([9u8; 20]));
        let tx = Transaction::sign(&producer, 0, register(Role::Producer)).unwrap();

        let pending = platform.prepare(&tx).unwrap();
        assert_eq!(pending.state().height, 1);
        assert_eq!(pending.receipt().height, 1);
        assert_eq!(platform.height(), 0);
        assert_eq!(platform.next_nonce(&producer.address()), 0);
        assert!(platform.state().registry.profile(&producer.address()).is_none());

        // Discarded drafts can be prepared again at the same nonce.
        drop(pending);
        let pending = platform.prepare(&tx).unwrap();
        let receipt = platform.commit_prepared(pending);
        assert_eq!(receipt.height, 1);
        assert_eq!(platform.height(), 1);
        assert_eq!(platform.next_nonce(&producer.address()), 1);
    }

    #[test]
    fn test_failed_call_leaves_state_untouched() {
        let producer = Address([1u8; 20]);
        let mut platform = platform(Address([9u8; 20]));
        platform.execute(&producer, &register(Role::Producer)).unwrap();

        let result = platform.execute(
            &producer,
            &Call::MintLot {
                total_units: 0,
                name: "cucumber".to_string(),
                units_per_token: 5,
            },
        );
        assert_eq!(result, Err(HarvestError::InvalidParameters));
        assert_eq!(platform.height(), 1);
        assert_eq!(platform.state().ledger.lot_count(), 0);
    }

    #[test]
    fn test_failed_desk_call_moves_no_tokens() {
        let owner = Address([9u8; 20]);
        let mut platform = platform(owner);
        let inspector = Address([2u8; 20]);
        platform.execute(&inspector, &register(Role::Inspector)).unwrap();

        let before = platform.state().token.balance_of(&inspector);
        let result = platform.execute(
            &inspector,
            &Call::AssignInspectorToProposal {
                proposal_id: 0,
                guaranteed_amount: 10,
            },
        );
        assert_eq!(result, Err(HarvestError::ProposalDoesNotExist));
        assert_eq!(platform.state().token.balance_of(&inspector), before);
    }

    #[test]
    fn test_submit_checks_signature_and_nonce() {
        let keypair = Keypair::generate();
        let mut platform = platform(Address([9u8; 20]));

        let tx = Transaction::sign(&keypair, 0, register(Role::Producer)).unwrap();
        let receipt = platform.submit(&tx).unwrap();
        assert_eq!(receipt.caller, keypair.address());
        assert_eq!(platform.next_nonce(&keypair.address()), 1);

        // Replay of the same nonce.
        assert_eq!(
            platform.submit(&tx),
            Err(HarvestError::InvalidNonce {
                expected: 1,
                got: 0
            })
        );

        let mut forged = Transaction::sign(
            &keypair,
            1,
            Call::MintLot {
                total_units: 10,
                name: "cucumber".to_string(),
                units_per_token: 5,
            },
        )
        .unwrap();
        forged.nonce = 2;
        assert_eq!(platform.submit(&forged), Err(HarvestError::InvalidSignature));
        assert_eq!(platform.height(), 1);
    }

    #[test]
    fn test_nonce_not_consumed_by_failed_call() {
        let keypair = Keypair::generate();
        let mut platform = platform(Address([9u8; 20]));

        // Unregistered caller cannot mint.
        let tx = Transaction::sign(
            &keypair,
            0,
            Call::MintLot {
                total_units: 10,
                name: "cucumber".to_string(),
                units_per_token: 5,
            },
        )
        .unwrap();
        assert_eq!(platform.submit(&tx), Err(HarvestError::InsufficientRole));
        assert_eq!(platform.next_nonce(&keypair.address()), 0);

        let tx = Transaction::sign(&keypair, 0, register(Role::Producer)).unwrap();
        platform.submit(&tx).unwrap();
        let tx = Transaction::sign(
            &keypair,
            1,
            Call::MintLot {
                total_units: 10,
                name: "cucumber".to_string(),
                units_per_token: 5,
            },
        )
        .unwrap();
        platform.submit(&tx).unwrap();
        assert_eq!(platform.state().ledger.units_of(&keypair.address(), 0), 10);
    }

    #[test]
    fn test_token_calls() {
        let owner = Address([9u8; 20]);
        let alice = Address([1u8; 20]);
        let mut platform = platform(owner);

        platform
            .execute(&owner, &Call::TransferToken { to: alice, amount: 25 })
            .unwrap();
        platform
            .execute(&alice, &Call::ApproveToken { spender: owner, amount: 5 })
            .unwrap();
        assert_eq!(platform.state().token.balance_of(&alice), 25);
        assert_eq!(platform.state().token.allowance(&alice, &owner), 5);
    }
}
