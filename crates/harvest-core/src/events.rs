// crates/harvest-core/src/events.rs
//
// Events emitted by committed transactions.
//
// Each event carries the identifiers an observer needs to rebuild state
// without re-querying. Events produced inside a transaction that later
// fails are discarded together with its state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::identity::Role;
use crate::{Amount, LotId, ProposalId, ProtocolId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HarvestEvent {
    UserRegistered {
        account: Address,
        username: String,
        email: String,
        role: Role,
    },
    CreatedLot {
        producer: Address,
        lot_id: LotId,
        total_units: u64,
        name: String,
        units_per_token: u64,
    },
    BurnedLot {
        producer: Address,
        lot_id: LotId,
        amount: u64,
    },
    CertificationRequested {
        lot_id: LotId,
        producer: Address,
    },
    CertificationRequestAccepted {
        lot_id: LotId,
        inspector: Address,
    },
    CertificationApproved {
        lot_id: LotId,
        inspector: Address,
    },
    CertificationRejected {
        lot_id: LotId,
        inspector: Address,
    },
    ProtocolRequested {
        protocol_id: ProtocolId,
        producer: Address,
    },
    NewMemberAdded {
        member: Address,
    },
    MemberRemoved {
        member: Address,
    },
    NewProposal {
        proposal_id: ProposalId,
        producer: Address,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: Address,
        support: bool,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
    },
    ProcessInspectionAccepted {
        proposal_id: ProposalId,
        inspector: Address,
    },
    InspectionFinalized {
        proposal_id: ProposalId,
        inspector: Address,
        passed: bool,
    },
    PurchaseReconciled {
        producer: Address,
        total_price: Amount,
        producer_share: Amount,
        credited_before: Amount,
        credited_after: Amount,
    },
    TokenTransferred {
        from: Address,
        to: Address,
        amount: Amount,
    },
    TokenApproved {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

impl HarvestEvent {
    /// Stable event name, matching the serialized `kind` tag.
    pub fn name(&self) -> &'static str {
        match self {
            HarvestEvent::UserRegistered { .. } => "user_registered",
            HarvestEvent::CreatedLot { .. } => "created_lot",
            HarvestEvent::BurnedLot { .. } => "burned_lot",
            HarvestEvent::CertificationRequested { .. } => "certification_requested",
            HarvestEvent::CertificationRequestAccepted { .. } => "certification_request_accepted",
            HarvestEvent::CertificationApproved { .. } => "certification_approved",
            HarvestEvent::CertificationRejected { .. } => "certification_rejected",
            HarvestEvent::ProtocolRequested { .. } => "protocol_requested",
            HarvestEvent::NewMemberAdded { .. } => "new_member_added",
            HarvestEvent::MemberRemoved { .. } => "member_removed",
            HarvestEvent::NewProposal { .. } => "new_proposal",
            HarvestEvent::VoteCast { .. } => "vote_cast",
            HarvestEvent::ProposalExecuted { .. } => "proposal_executed",
            HarvestEvent::ProcessInspectionAccepted { .. } => "process_inspection_accepted",
            HarvestEvent::InspectionFinalized { .. } => "inspection_finalized",
            HarvestEvent::PurchaseReconciled { .. } => "purchase_reconciled",
            HarvestEvent::TokenTransferred { .. } => "token_transferred",
            HarvestEvent::TokenApproved { .. } => "token_approved",
        }
    }
}

/// A committed event with its position in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Height of the committing transaction.
    pub height: u64,
    /// Position of the event within its transaction.
    pub index: u32,
    /// Transaction id (UUID v7).
    pub tx_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: HarvestEvent,
}
