// crates/harvest-governance/src/center.rs
//
// Governance Center operations.
//
// Settlement tokens owned by governance sit on the `holdings` address, a
// label-derived system account nobody can sign for. Every outflow
// (execution credit, purchase payout, inspection refund, owner withdrawal)
// is a transfer from that address and fails with `NotSufficientBalance`
// when holdings are short.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::Role;
use harvest_core::params::ProtocolParams;
use harvest_core::traits::{ProtocolBook, RoleDirectory, SettlementLedger};
use harvest_core::{Address, Amount, ProposalId, ProtocolId};
use harvest_economics::fees::reconcile_purchase;
use harvest_economics::guarantee::GuaranteeEscrow;

use crate::membership::DaoMembership;
use crate::proposal::Proposal;

/// Label the governance holdings address is derived from.
pub const GOVERNANCE_LABEL: &str = "governance";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceCenter {
    owner: Address,
    holdings: Address,
    /// Account allowed to report purchases. Falls back to the owner.
    marketplace_operator: Option<Address>,
    params: ProtocolParams,
    members: DaoMembership,
    proposals: Vec<Proposal>,
    credited: BTreeMap<Address, Amount>,
    guarantees: GuaranteeEscrow,
}

impl GovernanceCenter {
    pub fn new(owner: Address, params: ProtocolParams, marketplace_operator: Option<Address>) -> Self {
        Self {
            owner,
            holdings: Address::from_label(GOVERNANCE_LABEL),
            marketplace_operator,
            params,
            members: DaoMembership::new(),
            proposals: Vec::new(),
            credited: BTreeMap::new(),
            guarantees: GuaranteeEscrow::new(),
        }
    }

    fn require_owner(&self, caller: &Address) -> Result<(), HarvestError> {
        if *caller != self.owner {
            return Err(HarvestError::NotOwner);
        }
        Ok(())
    }

    fn require_member(&self, caller: &Address) -> Result<(), HarvestError> {
        if !self.members.contains(caller) {
            return Err(HarvestError::YouAreNotMemberOfDao);
        }
        Ok(())
    }

    fn require_holdings(&self, token: &dyn SettlementLedger, amount: Amount) -> Result<(), HarvestError> {
        let available = token.balance_of(&self.holdings);
        if available < amount {
            return Err(HarvestError::NotSufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    fn proposal_mut(&mut self, index: ProposalId) -> Result<&mut Proposal, HarvestError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(HarvestError::ProposalDoesNotExist)
    }

    // ---------------------------------------------------------------------
    // Membership
    // ---------------------------------------------------------------------

    /// Grant DAO membership to a registered inspector. Owner only.
    pub fn add_member(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        account: &Address,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_owner(caller)?;
        roles.require_role(account, Role::Inspector)?;

        self.members.add(*account);
        info!(member = %account, "DAO member added");
        Ok(HarvestEvent::NewMemberAdded { member: *account })
    }

    /// Revoke DAO membership. Owner only.
    pub fn remove_member(&mut self, caller: &Address, account: &Address) -> Result<HarvestEvent, HarvestError> {
        self.require_owner(caller)?;

        self.members.remove(account);
        info!(member = %account, "DAO member removed");
        Ok(HarvestEvent::MemberRemoved { member: *account })
    }

    // ---------------------------------------------------------------------
    // Proposal lifecycle
    // ---------------------------------------------------------------------

    /// Open a proposal for `producer` under `protocol_id`.
    ///
    /// The producer's protocol request is validated but not consumed here.
    pub fn create_proposal(
        &mut self,
        protocols: &dyn ProtocolBook,
        caller: &Address,
        description: &str,
        protocol_id: ProtocolId,
        producer: &Address,
        now: DateTime<Utc>,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_member(caller)?;
        if !protocols.is_protocol_requested(producer, protocol_id) {
            return Err(HarvestError::ThisProtocolNotRequestedByThisProducer);
        }

        let id = self.proposals.len() as ProposalId;
        let deadline = now
            .checked_add_signed(self.params.voting_window())
            .ok_or(HarvestError::DeadlineOutOfRange)?;
        self.proposals.push(Proposal::new(
            id,
            description.to_string(),
            protocol_id,
            *producer,
            *caller,
            now,
            deadline,
        ));
        info!(proposal_id = id, protocol_id, producer = %producer, %deadline, "Proposal created");

        Ok(HarvestEvent::NewProposal {
            proposal_id: id,
            producer: *producer,
        })
    }

    /// Cast one vote on an open proposal.
    pub fn vote(
        &mut self,
        caller: &Address,
        index: ProposalId,
        support: bool,
        now: DateTime<Utc>,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_member(caller)?;
        let proposal = self.proposal_mut(index)?;
        if !proposal.is_open(now) {
            return Err(HarvestError::DeadlineExceeded);
        }
        if proposal.has_voted(caller) {
            return Err(HarvestError::YouHaveAlreadyVoted);
        }

        proposal.voters.insert(*caller);
        if support {
            proposal.for_votes += 1;
        } else {
            proposal.against_votes += 1;
        }
        info!(proposal_id = index, voter = %caller, support, "Vote cast");

        Ok(HarvestEvent::VoteCast {
            proposal_id: index,
            voter: *caller,
            support,
        })
    }

    /// Execute a passing proposal after its deadline. Single-shot.
    ///
    /// Clears the producer's protocol flag, records `credit_amount` as the
    /// producer's advance credit, and transfers it from holdings.
    pub fn execute_proposal(
        &mut self,
        protocols: &mut dyn ProtocolBook,
        token: &mut dyn SettlementLedger,
        caller: &Address,
        index: ProposalId,
        credit_amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        self.require_member(caller)?;
        {
            let proposal = self.proposal_mut(index)?;
            if proposal.is_open(now) {
                return Err(HarvestError::DeadlineHasNotExceeded);
            }
            if proposal.executed {
                return Err(HarvestError::ProposalAlreadyExecuted);
            }
            if !proposal.has_majority() {
                return Err(HarvestError::ProposalDidntPass);
            }
        }
        self.require_holdings(token, credit_amount)?;

        let holdings = self.holdings;
        let proposal = self.proposal_mut(index)?;
        proposal.executed = true;
        proposal.passed_voting = true;
        proposal.credited_amount = credit_amount;
        let producer = proposal.producer;
        let protocol_id = proposal.protocol_id;

        protocols.clear_protocol_request(&producer, protocol_id);
        let credited = self.credited.entry(producer).or_insert(0);
        *credited = credited.saturating_add(credit_amount);
        let transfer = token.transfer(&holdings, &producer, credit_amount)?;

        info!(proposal_id = index, producer = %producer, credit_amount, "Proposal executed");

        Ok(vec![HarvestEvent::ProposalExecuted { proposal_id: index }, transfer])
    }

    // ---------------------------------------------------------------------
    // Marketplace reconciliation
    // ---------------------------------------------------------------------

    /// Reconcile one completed sale against the producer's credit.
    ///
    /// Only the marketplace operator (the owner when none is configured)
    /// may report sales.
    pub fn handle_purchase(
        &mut self,
        token: &mut dyn SettlementLedger,
        caller: &Address,
        producer: &Address,
        total_price: Amount,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        let operator = self.marketplace_operator.unwrap_or(self.owner);
        if *caller != operator {
            return Err(HarvestError::NotMarketplaceOperator);
        }

        let credited = self.credited_balance(producer);
        let outcome = reconcile_purchase(credited, total_price, self.params.producer_fee_percentage);
        self.require_holdings(token, outcome.payout)?;

        let mut events = Vec::new();
        if outcome.payout > 0 {
            events.push(token.transfer(&self.holdings, producer, outcome.payout)?);
        }
        if outcome.credited_after == 0 {
            self.credited.remove(producer);
        } else {
            self.credited.insert(*producer, outcome.credited_after);
        }

        info!(
            producer = %producer,
            total_price,
            share = outcome.share,
            credited_after = outcome.credited_after,
            payout = outcome.payout,
            "Purchase reconciled"
        );

        events.insert(
            0,
            HarvestEvent::PurchaseReconciled {
                producer: *producer,
                total_price,
                producer_share: outcome.share,
                credited_before: outcome.credited_before,
                credited_after: outcome.credited_after,
            },
        );
        Ok(events)
    }

    // ---------------------------------------------------------------------
    // Process inspection
    // ---------------------------------------------------------------------

    /// Assign `inspector` to a passed proposal and lock their stake.
    ///
    /// The stake is pulled from the inspector into holdings using the
    /// allowance the inspector granted `spender`.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_inspector_to_proposal(
        &mut self,
        roles: &dyn RoleDirectory,
        token: &mut dyn SettlementLedger,
        spender: &Address,
        index: ProposalId,
        inspector: &Address,
        guaranteed_amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        roles.require_role(inspector, Role::Inspector)?;
        {
            let proposal = self.proposal_mut(index)?;
            if !proposal.passed_voting {
                return Err(HarvestError::ProposalDidntPass);
            }
            if proposal.inspector.is_some() {
                return Err(HarvestError::InspectorAlreadyAssigned);
            }
        }

        let holdings = self.holdings;
        let transfer = token.transfer_from(spender, inspector, &holdings, guaranteed_amount)?;
        self.guarantees.lock(inspector, index, guaranteed_amount, now)?;
        self.proposal_mut(index)?.inspector = Some(*inspector);

        info!(proposal_id = index, inspector = %inspector, guaranteed_amount, "Process inspection accepted");

        Ok(vec![
            transfer,
            HarvestEvent::ProcessInspectionAccepted {
                proposal_id: index,
                inspector: *inspector,
            },
        ])
    }

    /// Record the inspection outcome. Single-shot.
    ///
    /// Passed: stake plus `fee` go back to the inspector. Failed: the stake
    /// stays in holdings.
    pub fn set_passed_inspection(
        &mut self,
        token: &mut dyn SettlementLedger,
        caller: &Address,
        inspector: &Address,
        index: ProposalId,
        passed: bool,
        fee: Amount,
    ) -> Result<Vec<HarvestEvent>, HarvestError> {
        {
            let proposal = self.proposal_mut(index)?;
            if caller != inspector || proposal.inspector != Some(*inspector) {
                return Err(HarvestError::YouAreNotTheInspectorOfThisProposal);
            }
            if proposal.inspection_finalized {
                return Err(HarvestError::InspectionAlreadyFinalized);
            }
        }

        let mut events = Vec::new();
        if passed {
            let stake = self.guarantees.amount_of(inspector, index);
            let refund = stake.saturating_add(fee);
            self.require_holdings(token, refund)?;
            self.guarantees.release(inspector, index)?;
            events.push(token.transfer(&self.holdings, inspector, refund)?);
        } else {
            self.guarantees.forfeit(inspector, index)?;
        }

        let proposal = self.proposal_mut(index)?;
        proposal.passed_inspection = passed;
        proposal.inspection_finalized = true;

        info!(proposal_id = index, inspector = %inspector, passed, "Inspection finalized");

        events.push(HarvestEvent::InspectionFinalized {
            proposal_id: index,
            inspector: *inspector,
            passed,
        });
        Ok(events)
    }

    // ---------------------------------------------------------------------
    // Treasury
    // ---------------------------------------------------------------------

    /// Move `amount` from holdings to the owner. Owner only.
    pub fn withdraw_settlement_token(
        &mut self,
        token: &mut dyn SettlementLedger,
        caller: &Address,
        amount: Amount,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_owner(caller)?;
        let event = token.transfer(&self.holdings, &self.owner, amount)?;
        info!(owner = %self.owner, amount, "Settlement tokens withdrawn");
        Ok(event)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Address holding governance-owned settlement tokens.
    pub fn holdings_address(&self) -> Address {
        self.holdings
    }

    pub fn marketplace_operator(&self) -> Address {
        self.marketplace_operator.unwrap_or(self.owner)
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn is_member(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    pub fn members(&self) -> Vec<Address> {
        self.members.iter().copied().collect()
    }

    pub fn proposal(&self, index: ProposalId) -> Option<&Proposal> {
        usize::try_from(index).ok().and_then(|i| self.proposals.get(i))
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn credited_balance(&self, producer: &Address) -> Amount {
        self.credited.get(producer).copied().unwrap_or(0)
    }

    pub fn guaranteed_amount(&self, inspector: &Address, index: ProposalId) -> Amount {
        self.guarantees.amount_of(inspector, index)
    }

    pub fn guarantees(&self) -> &GuaranteeEscrow {
        &self.guarantees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use harvest_certification::ProtocolRegistry;
    use harvest_economics::token::SettlementToken;
    use harvest_ledger::IdentityRegistry;

    const CREDIT: Amount = 10;

    fn owner() -> Address {
        Address([9u8; 20])
    }
    fn producer() -> Address {
        Address([1u8; 20])
    }
    fn inspector() -> Address {
        Address([2u8; 20])
    }
    fn second_inspector() -> Address {
        Address([3u8; 20])
    }
    fn third_inspector() -> Address {
        Address([4u8; 20])
    }
    fn desk() -> Address {
        Address::from_label("desk")
    }

    struct Fixture {
        now: DateTime<Utc>,
        roles: IdentityRegistry,
        protocols: ProtocolRegistry,
        token: SettlementToken,
        center: GovernanceCenter,
    }

    impl Fixture {
        /// Owner holds 1000 tokens, governance 100. Three inspector members,
        /// one producer with protocol 1 requested.
        fn new() -> Self {
            let now = Utc::now();
            let mut roles = IdentityRegistry::new();
            roles
                .register(&producer(), "farmer", "f@farm.io", Role::Producer, now)
                .unwrap();
            for (i, account) in [inspector(), second_inspector(), third_inspector()].iter().enumerate() {
                roles
                    .register(account, &format!("inspector{}", i), "i@farm.io", Role::Inspector, now)
                    .unwrap();
            }

            let mut protocols = ProtocolRegistry::new();
            protocols
                .request_protocol_with_dao(&roles, &producer(), 1)
                .unwrap();

            let mut center = GovernanceCenter::new(owner(), ProtocolParams::default(), None);
            let mut token = SettlementToken::with_genesis(owner(), 1_100);
            token
                .transfer(&owner(), &center.holdings_address(), 100)
                .unwrap();
            token.transfer(&owner(), &inspector(), 50).unwrap();

            for account in [inspector(), second_inspector(), third_inspector()] {
                center.add_member(&roles, &owner(), &account).unwrap();
            }

            Self {
                now,
                roles,
                protocols,
                token,
                center,
            }
        }

        fn after_deadline(&self) -> DateTime<Utc> {
            self.now + self.center.params().voting_window() + Duration::seconds(1)
        }

        fn propose(&mut self) -> ProposalId {
            self.center
                .create_proposal(&self.protocols, &inspector(), "cucumbers", 1, &producer(), self.now)
                .unwrap();
            self.center.proposal_count() - 1
        }

        fn pass_and_execute(&mut self) -> ProposalId {
            let id = self.propose();
            self.center.vote(&inspector(), id, true, self.now).unwrap();
            let later = self.after_deadline();
            self.center
                .execute_proposal(&mut self.protocols, &mut self.token, &inspector(), id, CREDIT, later)
                .unwrap();
            id
        }

        fn assign(&mut self, id: ProposalId, stake: Amount) -> Result<Vec<HarvestEvent>, HarvestError> {
            self.token.approve(&inspector(), &desk(), stake);
            self.center.assign_inspector_to_proposal(
                &self.roles,
                &mut self.token,
                &desk(),
                id,
                &inspector(),
                stake,
                self.now,
            )
        }
    }

    #[test]
    fn test_membership_is_owner_only() {
        let mut f = Fixture::new();
        assert_eq!(
            f.center.add_member(&f.roles, &inspector(), &second_inspector()),
            Err(HarvestError::NotOwner)
        );
        assert_eq!(
            f.center.remove_member(&inspector(), &second_inspector()),
            Err(HarvestError::NotOwner)
        );
        assert_eq!(
            f.center.add_member(&f.roles, &owner(), &producer()),
            Err(HarvestError::InsufficientRole)
        );

        f.center.remove_member(&owner(), &second_inspector()).unwrap();
        assert!(!f.center.is_member(&second_inspector()));
        assert_eq!(f.center.members().len(), 2);
    }

    #[test]
    fn test_create_proposal_requires_member_and_request() {
        let mut f = Fixture::new();
        assert_eq!(
            f.center
                .create_proposal(&f.protocols, &producer(), "x", 1, &producer(), f.now),
            Err(HarvestError::YouAreNotMemberOfDao)
        );
        assert_eq!(
            f.center
                .create_proposal(&f.protocols, &inspector(), "x", 2, &producer(), f.now),
            Err(HarvestError::ThisProtocolNotRequestedByThisProducer)
        );

        let id = f.propose();
        assert_eq!(id, 0);
        let p = f.center.proposal(0).unwrap();
        assert_eq!(p.deadline, f.now + Duration::days(3));
        assert_eq!(p.for_votes + p.against_votes, 0);
        // Flag is validated, not consumed.
        assert!(f.protocols.is_protocol_requested(&producer(), 1));
    }

    #[test]
    fn test_unrepresentable_deadline_is_an_error() {
        let mut f = Fixture::new();
        let params = ProtocolParams {
            voting_window_secs: 100_000_000_000_000,
            ..ProtocolParams::default()
        };
        f.center = GovernanceCenter::new(owner(), params, None);
        f.center.add_member(&f.roles, &owner(), &inspector()).unwrap();

        assert_eq!(
            f.center
                .create_proposal(&f.protocols, &inspector(), "x", 1, &producer(), f.now),
            Err(HarvestError::DeadlineOutOfRange)
        );
        assert_eq!(f.center.proposal_count(), 0);
    }

    #[test]
    fn test_vote_rules() {
        let mut f = Fixture::new();
        let id = f.propose();

        f.center.vote(&inspector(), id, true, f.now).unwrap();
        assert_eq!(
            f.center.vote(&inspector(), id, false, f.now),
            Err(HarvestError::YouHaveAlreadyVoted)
        );
        assert_eq!(
            f.center.vote(&producer(), id, true, f.now),
            Err(HarvestError::YouAreNotMemberOfDao)
        );
        assert_eq!(
            f.center.vote(&second_inspector(), 7, true, f.now),
            Err(HarvestError::ProposalDoesNotExist)
        );
        let later = f.after_deadline();
        assert_eq!(
            f.center.vote(&second_inspector(), id, true, later),
            Err(HarvestError::DeadlineExceeded)
        );

        let p = f.center.proposal(id).unwrap();
        assert_eq!((p.for_votes, p.against_votes), (1, 0));
    }

    #[test]
    fn test_execute_before_deadline_fails() {
        let mut f = Fixture::new();
        let id = f.propose();
        f.center.vote(&inspector(), id, true, f.now).unwrap();
        assert_eq!(
            f.center
                .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, CREDIT, f.now),
            Err(HarvestError::DeadlineHasNotExceeded)
        );
    }

    #[test]
    fn test_execute_credits_and_clears_flag() {
        let mut f = Fixture::new();
        let id = f.propose();
        f.center.vote(&inspector(), id, true, f.now).unwrap();
        let later = f.after_deadline();
        let events = f
            .center
            .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, CREDIT, later)
            .unwrap();

        assert_eq!(events[0], HarvestEvent::ProposalExecuted { proposal_id: id });
        assert_eq!(
            events[1],
            HarvestEvent::TokenTransferred {
                from: f.center.holdings_address(),
                to: producer(),
                amount: CREDIT
            }
        );
        let p = f.center.proposal(id).unwrap();
        assert!(p.executed && p.passed_voting);
        assert_eq!(p.credited_amount, CREDIT);
        assert_eq!(f.center.credited_balance(&producer()), CREDIT);
        assert_eq!(f.token.balance_of(&producer()), CREDIT);
        assert!(!f.protocols.is_protocol_requested(&producer(), 1));

        assert_eq!(
            f.center
                .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, CREDIT, later),
            Err(HarvestError::ProposalAlreadyExecuted)
        );
        assert_eq!(f.center.credited_balance(&producer()), CREDIT);
    }

    #[test]
    fn test_credit_accumulates_across_executions() {
        let mut f = Fixture::new();
        f.pass_and_execute();
        f.protocols
            .request_protocol_with_dao(&f.roles, &producer(), 2)
            .unwrap();
        f.center
            .create_proposal(&f.protocols, &inspector(), "tomatoes", 2, &producer(), f.now)
            .unwrap();
        let id = f.center.proposal_count() - 1;
        f.center.vote(&inspector(), id, true, f.now).unwrap();
        let later = f.after_deadline();
        f.center
            .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, CREDIT, later)
            .unwrap();

        assert_eq!(f.center.credited_balance(&producer()), 2 * CREDIT);
        assert_eq!(f.token.balance_of(&producer()), 2 * CREDIT);
    }

    #[test]
    fn test_execute_defeated_proposal_fails() {
        let mut f = Fixture::new();
        let id = f.propose();
        f.center.vote(&inspector(), id, true, f.now).unwrap();
        f.center.vote(&second_inspector(), id, false, f.now).unwrap();
        f.center.vote(&third_inspector(), id, false, f.now).unwrap();
        let later = f.after_deadline();
        assert_eq!(
            f.center
                .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, CREDIT, later),
            Err(HarvestError::ProposalDidntPass)
        );
        assert!(!f.center.proposal(id).unwrap().executed);
        assert!(f.protocols.is_protocol_requested(&producer(), 1));
    }

    #[test]
    fn test_execute_without_holdings_fails() {
        let mut f = Fixture::new();
        let id = f.propose();
        f.center.vote(&inspector(), id, true, f.now).unwrap();
        let later = f.after_deadline();
        assert_eq!(
            f.center
                .execute_proposal(&mut f.protocols, &mut f.token, &inspector(), id, 500, later),
            Err(HarvestError::NotSufficientBalance {
                requested: 500,
                available: 100
            })
        );
        assert!(!f.center.proposal(id).unwrap().executed);
    }

    #[test]
    fn test_purchase_within_credit() {
        let mut f = Fixture::new();
        f.pass_and_execute();
        let producer_balance = f.token.balance_of(&producer());

        // share = 12 - floor(20 * 12 / 100) = 10 == credit
        let events = f
            .center
            .handle_purchase(&mut f.token, &owner(), &producer(), 12)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(f.center.credited_balance(&producer()), 0);
        assert_eq!(f.token.balance_of(&producer()), producer_balance);
    }

    #[test]
    fn test_purchase_exceeding_credit_pays_excess() {
        let mut f = Fixture::new();
        f.pass_and_execute();
        let producer_balance = f.token.balance_of(&producer());

        // share = 20 - 4 = 16, credit 10 -> payout 6
        let events = f
            .center
            .handle_purchase(&mut f.token, &owner(), &producer(), 20)
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(f.center.credited_balance(&producer()), 0);
        assert_eq!(f.token.balance_of(&producer()), producer_balance + 6);
    }

    #[test]
    fn test_purchase_requires_operator() {
        let mut f = Fixture::new();
        assert_eq!(
            f.center
                .handle_purchase(&mut f.token, &inspector(), &producer(), 12),
            Err(HarvestError::NotMarketplaceOperator)
        );
    }

    #[test]
    fn test_assign_requires_passed_proposal() {
        let mut f = Fixture::new();
        let id = f.propose();
        assert_eq!(f.assign(id, 20), Err(HarvestError::ProposalDidntPass));
        assert_eq!(f.assign(42, 20), Err(HarvestError::ProposalDoesNotExist));
    }

    #[test]
    fn test_assign_locks_stake() {
        let mut f = Fixture::new();
        let id = f.pass_and_execute();
        let holdings_before = f.token.balance_of(&f.center.holdings_address());

        f.assign(id, 20).unwrap();
        assert_eq!(f.center.proposal(id).unwrap().inspector, Some(inspector()));
        assert_eq!(f.center.guaranteed_amount(&inspector(), id), 20);
        assert_eq!(f.token.balance_of(&inspector()), 30);
        assert_eq!(
            f.token.balance_of(&f.center.holdings_address()),
            holdings_before + 20
        );
        assert_eq!(f.assign(id, 20), Err(HarvestError::InspectorAlreadyAssigned));
    }

    #[test]
    fn test_assign_without_allowance_fails() {
        let mut f = Fixture::new();
        let id = f.pass_and_execute();
        let result = f.center.assign_inspector_to_proposal(
            &f.roles,
            &mut f.token,
            &desk(),
            id,
            &inspector(),
            20,
            f.now,
        );
        assert!(matches!(result, Err(HarvestError::NotSufficientAllowance { .. })));
        assert!(f.center.proposal(id).unwrap().inspector.is_none());
    }

    #[test]
    fn test_passed_inspection_refunds_stake_and_fee() {
        let mut f = Fixture::new();
        let id = f.pass_and_execute();
        f.assign(id, 20).unwrap();

        let fee = f.center.params().inspector_fee;
        f.center
            .set_passed_inspection(&mut f.token, &inspector(), &inspector(), id, true, fee)
            .unwrap();
        assert_eq!(f.token.balance_of(&inspector()), 50 + fee);
        let p = f.center.proposal(id).unwrap();
        assert!(p.passed_inspection && p.inspection_finalized);

        assert_eq!(
            f.center
                .set_passed_inspection(&mut f.token, &inspector(), &inspector(), id, true, fee),
            Err(HarvestError::InspectionAlreadyFinalized)
        );
    }

    #[test]
    fn test_failed_inspection_forfeits_stake() {
        let mut f = Fixture::new();
        let id = f.pass_and_execute();
        f.assign(id, 20).unwrap();
        let holdings = f.token.balance_of(&f.center.holdings_address());

        let events = f
            .center
            .set_passed_inspection(&mut f.token, &inspector(), &inspector(), id, false, 5)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(f.token.balance_of(&inspector()), 30);
        assert_eq!(f.token.balance_of(&f.center.holdings_address()), holdings);
        assert!(!f.center.proposal(id).unwrap().passed_inspection);
    }

    #[test]
    fn test_only_assigned_inspector_finalizes() {
        let mut f = Fixture::new();
        let id = f.pass_and_execute();
        f.assign(id, 20).unwrap();
        assert_eq!(
            f.center.set_passed_inspection(
                &mut f.token,
                &second_inspector(),
                &second_inspector(),
                id,
                true,
                5
            ),
            Err(HarvestError::YouAreNotTheInspectorOfThisProposal)
        );
        assert_eq!(
            f.center
                .set_passed_inspection(&mut f.token, &second_inspector(), &inspector(), id, true, 5),
            Err(HarvestError::YouAreNotTheInspectorOfThisProposal)
        );
    }

    #[test]
    fn test_withdraw_is_owner_only() {
        let mut f = Fixture::new();
        assert_eq!(
            f.center.withdraw_settlement_token(&mut f.token, &inspector(), 10),
            Err(HarvestError::NotOwner)
        );
        let before = f.token.balance_of(&owner());
        let event = f
            .center
            .withdraw_settlement_token(&mut f.token, &owner(), 30)
            .unwrap();
        assert_eq!(
            event,
            HarvestEvent::TokenTransferred {
                from: f.center.holdings_address(),
                to: owner(),
                amount: 30
            }
        );
        assert_eq!(f.token.balance_of(&owner()), before + 30);
        assert!(f
            .center
            .withdraw_settlement_token(&mut f.token, &owner(), 1_000)
            .is_err());
    }
}
