// crates/harvest-governance/src/proposal.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvest_core::{Address, Amount, ProposalId, ProtocolId};

/// A governance proposal to credit a producer under a signed protocol.
///
/// Proposals are never deleted. `executed` flips once; the inspection
/// fields are only meaningful after a passing execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub description: String,
    pub protocol_id: ProtocolId,
    /// Producer to be credited.
    pub producer: Address,
    pub proposer: Address,
    pub for_votes: u64,
    pub against_votes: u64,
    /// Members that have voted, either way.
    pub voters: BTreeSet<Address>,
    pub created_at: DateTime<Utc>,
    /// Voting closes once `now > deadline`.
    pub deadline: DateTime<Utc>,
    pub executed: bool,
    pub passed_voting: bool,
    pub passed_inspection: bool,
    pub inspection_finalized: bool,
    pub inspector: Option<Address>,
    pub credited_amount: Amount,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        description: String,
        protocol_id: ProtocolId,
        producer: Address,
        proposer: Address,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description,
            protocol_id,
            producer,
            proposer,
            for_votes: 0,
            against_votes: 0,
            voters: BTreeSet::new(),
            created_at,
            deadline,
            executed: false,
            passed_voting: false,
            passed_inspection: false,
            inspection_finalized: false,
            inspector: None,
            credited_amount: 0,
        }
    }

    /// Whether votes are still accepted at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline
    }

    /// Strict majority of cast votes. A 0/0 tally does not pass.
    pub fn has_majority(&self) -> bool {
        self.for_votes > self.against_votes
    }

    pub fn has_voted(&self, member: &Address) -> bool {
        self.voters.contains(member)
    }

    /// Short lifecycle label for listings.
    pub fn status(&self, now: DateTime<Utc>) -> &'static str {
        if self.inspection_finalized {
            if self.passed_inspection {
                "inspection_passed"
            } else {
                "inspection_failed"
            }
        } else if self.inspector.is_some() {
            "under_inspection"
        } else if self.executed {
            "executed"
        } else if self.is_open(now) {
            "voting"
        } else if self.has_majority() {
            "awaiting_execution"
        } else {
            "defeated"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn proposal(now: DateTime<Utc>) -> Proposal {
        Proposal::new(
            0,
            "organic cucumbers".to_string(),
            1,
            Address([1u8; 20]),
            Address([2u8; 20]),
            now,
            now + Duration::days(3),
        )
    }

    #[test]
    fn test_window_inclusive_of_deadline() {
        let now = Utc::now();
        let p = proposal(now);
        assert!(p.is_open(now));
        assert!(p.is_open(p.deadline));
        assert!(!p.is_open(p.deadline + Duration::seconds(1)));
    }

    #[test]
    fn test_majority_is_strict() {
        let mut p = proposal(Utc::now());
        assert!(!p.has_majority());
        p.for_votes = 2;
        p.against_votes = 2;
        assert!(!p.has_majority());
        p.for_votes = 3;
        assert!(p.has_majority());
    }

    #[test]
    fn test_status_progression() {
        let now = Utc::now();
        let mut p = proposal(now);
        assert_eq!(p.status(now), "voting");
        let later = p.deadline + Duration::seconds(1);
        assert_eq!(p.status(later), "defeated");
        p.for_votes = 1;
        assert_eq!(p.status(later), "awaiting_execution");
        p.executed = true;
        p.passed_voting = true;
        assert_eq!(p.status(later), "executed");
        p.inspector = Some(Address([3u8; 20]));
        assert_eq!(p.status(later), "under_inspection");
        p.inspection_finalized = true;
        assert_eq!(p.status(later), "inspection_failed");
    }
}
