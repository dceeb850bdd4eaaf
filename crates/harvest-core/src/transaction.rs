// crates/harvest-core/src/transaction.rs
//
// Signed transaction envelope and the set of inbound operations.
//
// Signing digest: SHA-256( json(call) || nonce (u64 LE) || signer key bytes ).
// The caller address is derived from the signer key, never taken from input.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::{hash_bytes, verify_signature, Keypair};
use crate::error::HarvestError;
use crate::identity::Role;
use crate::{Amount, LotId, ProposalId, ProtocolId};

/// An inbound operation. The caller is implied by the transaction signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    Register {
        username: String,
        email: String,
        role: Role,
    },
    MintLot {
        total_units: u64,
        name: String,
        units_per_token: u64,
    },
    BurnLot {
        lot_id: LotId,
        amount: u64,
    },
    RequestCertification {
        lot_id: LotId,
    },
    AcceptCertificationRequest {
        lot_id: LotId,
    },
    ApproveCertification {
        lot_id: LotId,
    },
    RejectCertification {
        lot_id: LotId,
    },
    RequestProtocolWithDao {
        protocol_id: ProtocolId,
    },
    AddMember {
        account: Address,
    },
    RemoveMember {
        account: Address,
    },
    CreateProposal {
        description: String,
        protocol_id: ProtocolId,
        producer: Address,
    },
    Vote {
        proposal_id: ProposalId,
        support: bool,
    },
    ExecuteProposal {
        proposal_id: ProposalId,
        credit_amount: Amount,
    },
    AssignInspectorToProposal {
        proposal_id: ProposalId,
        guaranteed_amount: Amount,
    },
    ApproveProcessInspection {
        proposal_id: ProposalId,
    },
    FailProcessInspection {
        proposal_id: ProposalId,
    },
    WithdrawSettlementToken {
        amount: Amount,
    },
    /// Reported by the marketplace operator after a completed sale.
    HandlePurchase {
        producer: Address,
        total_price: Amount,
    },
    TransferToken {
        to: Address,
        amount: Amount,
    },
    ApproveToken {
        spender: Address,
        amount: Amount,
    },
}

impl Call {
    /// Stable name for logs, matching the serialized `call` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Register { .. } => "register",
            Call::MintLot { .. } => "mint_lot",
            Call::BurnLot { .. } => "burn_lot",
            Call::RequestCertification { .. } => "request_certification",
            Call::AcceptCertificationRequest { .. } => "accept_certification_request",
            Call::ApproveCertification { .. } => "approve_certification",
            Call::RejectCertification { .. } => "reject_certification",
            Call::RequestProtocolWithDao { .. } => "request_protocol_with_dao",
            Call::AddMember { .. } => "add_member",
            Call::RemoveMember { .. } => "remove_member",
            Call::CreateProposal { .. } => "create_proposal",
            Call::Vote { .. } => "vote",
            Call::ExecuteProposal { .. } => "execute_proposal",
            Call::AssignInspectorToProposal { .. } => "assign_inspector_to_proposal",
            Call::ApproveProcessInspection { .. } => "approve_process_inspection",
            Call::FailProcessInspection { .. } => "fail_process_inspection",
            Call::WithdrawSettlementToken { .. } => "withdraw_settlement_token",
            Call::HandlePurchase { .. } => "handle_purchase",
            Call::TransferToken { .. } => "transfer_token",
            Call::ApproveToken { .. } => "approve_token",
        }
    }
}

/// A signed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Hex-encoded ed25519 public key of the signer.
    pub signer: String,
    /// Must equal the signer's next nonce.
    pub nonce: u64,
    pub call: Call,
    /// Hex-encoded 64-byte ed25519 signature over `signing_digest`.
    pub signature: String,
}

impl Transaction {
    /// Build and sign a transaction with `keypair`.
    pub fn sign(keypair: &Keypair, nonce: u64, call: Call) -> Result<Self, HarvestError> {
        let signer = hex::encode(keypair.public_key_bytes());
        let digest = signing_digest(&signer, nonce, &call)?;
        let signature = hex::encode(keypair.sign(&digest));
        Ok(Transaction {
            signer,
            nonce,
            call,
            signature,
        })
    }

    /// Address controlled by the signer key.
    pub fn caller(&self) -> Result<Address, HarvestError> {
        Ok(Address::from_public_key(&self.signer_key()?))
    }

    /// Verify the signature and return the caller address.
    pub fn verify(&self) -> Result<Address, HarvestError> {
        let key = self.signer_key()?;
        let digest = signing_digest(&self.signer, self.nonce, &self.call)?;
        let signature = hex::decode(&self.signature).map_err(|_| HarvestError::InvalidSignature)?;
        match verify_signature(&key, &digest, &signature) {
            Ok(true) => Ok(Address::from_public_key(&key)),
            _ => Err(HarvestError::InvalidSignature),
        }
    }

    fn signer_key(&self) -> Result<[u8; 32], HarvestError> {
        let bytes = hex::decode(&self.signer)
            .map_err(|e| HarvestError::Crypto(format!("Invalid signer key hex: {}", e)))?;
        bytes
            .try_into()
            .map_err(|_| HarvestError::Crypto("Signer key must be exactly 32 bytes".to_string()))
    }
}

/// Digest a signer commits to for `(nonce, call)`.
pub fn signing_digest(signer: &str, nonce: u64, call: &Call) -> Result<[u8; 32], HarvestError> {
    let mut message = serde_json::to_vec(call)?;
    message.extend_from_slice(&nonce.to_le_bytes());
    message.extend_from_slice(signer.as_bytes());
    Ok(hash_bytes(&message))
}
