use thiserror::Error;

/// Protocol-wide error types for the Harvest Protocol.
///
/// Every variant aborts the whole transaction: no state or events from a
/// failed operation are ever committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarvestError {
    // --- Authorization -----------------------------------------------------
    /// Caller is unregistered or holds a different role.
    #[error("Insufficient role for this operation")]
    InsufficientRole,

    /// Caller is not a DAO member.
    #[error("You are not a member of the DAO")]
    YouAreNotMemberOfDao,

    /// Caller is not the governance owner.
    #[error("Only the governance owner may perform this operation")]
    NotOwner,

    /// Caller is not the configured marketplace operator.
    #[error("Only the marketplace operator may report purchases")]
    NotMarketplaceOperator,

    // --- Precondition / state ----------------------------------------------
    #[error("Account is already registered")]
    AlreadyRegistered,

    /// Username or email is empty.
    #[error("Invalid username or email")]
    InvalidInput,

    /// Lot parameters are zero or empty.
    #[error("Invalid lot parameters")]
    InvalidParameters,

    #[error("Token does not exist")]
    TokenDoesNotExist,

    /// A certification request for this lot is already open.
    #[error("Certification already requested for this lot")]
    CertificationAlreadyRequested,

    #[error("Lot is already certified")]
    AlreadyCertified,

    #[error("Inspection request not found")]
    InspectionRequestNotFound,

    #[error("You didn't accept any request with this token id")]
    YouDidntAcceptAnyRequestWithThisTokenId,

    #[error("Proposal does not exist")]
    ProposalDoesNotExist,

    #[error("Proposal already executed")]
    ProposalAlreadyExecuted,

    #[error("Voting deadline exceeded")]
    DeadlineExceeded,

    #[error("Voting deadline has not exceeded")]
    DeadlineHasNotExceeded,

    /// Creation time plus voting window is past the last representable date.
    #[error("Voting deadline out of range")]
    DeadlineOutOfRange,

    #[error("You have already voted")]
    YouHaveAlreadyVoted,

    #[error("This protocol was not requested by this producer")]
    ThisProtocolNotRequestedByThisProducer,

    #[error("An inspector is already assigned to this proposal")]
    InspectorAlreadyAssigned,

    #[error("You are not the inspector of this proposal")]
    YouAreNotTheInspectorOfThisProposal,

    #[error("Inspection outcome already recorded for this proposal")]
    InspectionAlreadyFinalized,

    // --- Resources -----------------------------------------------------------
    #[error("Not enough token: requested {requested}, available {available}")]
    NotEnoughToken { requested: u64, available: u64 },

    #[error("Not sufficient balance: requested {requested}, available {available}")]
    NotSufficientBalance { requested: u64, available: u64 },

    #[error("Not sufficient allowance: requested {requested}, allowed {allowed}")]
    NotSufficientAllowance { requested: u64, allowed: u64 },

    // --- Outcome -------------------------------------------------------------
    #[error("Proposal didn't pass")]
    ProposalDidntPass,

    // --- Transaction envelope ------------------------------------------------
    #[error("Invalid transaction signature")]
    InvalidSignature,

    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // --- Ambient ---------------------------------------------------------------
    /// Storage layer error (RocksDB).
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cryptographic error (key parsing, malformed signatures).
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Invalid protocol or node configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for HarvestError {
    fn from(e: serde_json::Error) -> Self {
        HarvestError::Serialization(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for HarvestError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        HarvestError::Crypto(e.to_string())
    }
}
