use log::{debug, info};

use crate::errors::{TreasuryError, TreasuryResult};
use crate::ledger::events::{EventLog, EventRecord, TreasuryEvent};
use crate::ledger::Ledger;
use crate::treasury::{
    EmergencyModule, PolicyManager, Proposal, SpendingLimitPolicy, TreasuryAccount,
};
use crate::types::{
    Address, Amount, EmergencyModuleId, PolicyManagerId, ProposalId, Timestamp, TreasuryId,
};

/// Entry point for every treasury operation.
///
/// Each method is one synchronous, all-or-nothing call: the entity locks
/// are held for the whole call, every check precedes the first mutation,
/// and a failure leaves no trace in state or in the event log. Methods
/// that compare against time take `now` from the caller instead of reading
/// a clock. Operations touching several entities lock them in a fixed
/// order (treasury, then proposal, then emergency module) so concurrent
/// mixed calls cannot deadlock.
pub struct TreasuryEngine {
    ledger: Ledger,
    events: EventLog,
}

impl TreasuryEngine {
    pub fn new() -> Self {
        TreasuryEngine {
            ledger: Ledger::new(),
            events: EventLog::new(),
        }
    }

    /// Create a treasury governed by `signers` with the given threshold.
    ///
    /// The emergency signer set is stored on the account together with its
    /// supermajority; actual emergency withdrawal goes through a separately
    /// created [`EmergencyModule`].
    pub fn create_treasury(
        &self,
        caller: Address,
        name: String,
        asset: String,
        signers: Vec<Address>,
        threshold: usize,
        emergency_signers: Vec<Address>,
    ) -> TreasuryResult<TreasuryId> {
        let account = TreasuryAccount::new(name, asset, signers, threshold, emergency_signers)?;
        let treasury_id = self.ledger.insert_treasury(account);
        self.events.append(TreasuryEvent::TreasuryCreated {
            treasury_id,
            creator: caller,
            threshold,
        });
        info!(
            "treasury {} created by {} with threshold {}",
            treasury_id, caller, threshold
        );
        Ok(treasury_id)
    }

    /// Credit a treasury's balance, returning the new balance.
    pub fn deposit(&self, treasury_id: TreasuryId, amount: Amount) -> TreasuryResult<Amount> {
        let slot = self.ledger.treasury(treasury_id)?;
        let mut treasury = slot.write();
        let balance = treasury.deposit(amount)?;
        debug!(
            "deposit of {} into {} brings the balance to {}",
            amount, treasury_id, balance
        );
        Ok(balance)
    }

    /// Freeze a treasury. Requires emergency signer authority.
    pub fn freeze(&self, caller: Address, treasury_id: TreasuryId) -> TreasuryResult<()> {
        let slot = self.ledger.treasury(treasury_id)?;
        let mut treasury = slot.write();
        treasury.freeze(&caller)?;
        self.events
            .append(TreasuryEvent::TreasuryFrozen { treasury_id });
        info!("treasury {} frozen by {}", treasury_id, caller);
        Ok(())
    }

    /// Unfreeze a treasury. Requires primary signer authority.
    pub fn unfreeze(&self, caller: Address, treasury_id: TreasuryId) -> TreasuryResult<()> {
        let slot = self.ledger.treasury(treasury_id)?;
        let mut treasury = slot.write();
        treasury.unfreeze(&caller)?;
        info!("treasury {} unfrozen by {}", treasury_id, caller);
        Ok(())
    }

    /// Create a pending spend proposal against a treasury.
    ///
    /// Creation is open to any caller; only signing is membership gated.
    /// The time lock starts counting from `now`.
    pub fn create_proposal(
        &self,
        caller: Address,
        treasury_id: TreasuryId,
        category: String,
        recipient: Address,
        amount: Amount,
        time_lock_duration: u64,
        description: String,
        now: Timestamp,
    ) -> TreasuryResult<ProposalId> {
        let slot = self.ledger.treasury(treasury_id)?;
        let mut treasury = slot.write();
        let proposal = Proposal::new(
            treasury_id,
            caller,
            category,
            recipient,
            amount,
            time_lock_duration,
            description,
            now,
        )?;
        let proposal_id = self.ledger.insert_proposal(proposal);
        treasury.proposal_count = treasury.proposal_count.saturating_add(1);
        self.events
            .append(TreasuryEvent::ProposalCreated { proposal_id, amount });
        info!(
            "proposal {} for {} created against {} by {}",
            proposal_id, amount, treasury_id, caller
        );
        Ok(proposal_id)
    }

    /// Record the caller's approval on a pending proposal, returning the
    /// new signature count.
    pub fn sign_proposal(
        &self,
        caller: Address,
        treasury_id: TreasuryId,
        proposal_id: ProposalId,
    ) -> TreasuryResult<usize> {
        let treasury_slot = self.ledger.treasury(treasury_id)?;
        let proposal_slot = self.ledger.proposal(proposal_id)?;
        let treasury = treasury_slot.read();
        let mut proposal = proposal_slot.write();

        if proposal.treasury_id != treasury_id {
            return Err(TreasuryError::NotAuthorized);
        }
        if !treasury.is_signer(&caller) {
            return Err(TreasuryError::NotAuthorized);
        }
        let signature_count = proposal.record_signature(caller)?;
        self.events.append(TreasuryEvent::ProposalSigned {
            proposal_id,
            signer: caller,
            signature_count,
        });
        info!(
            "proposal {} signed by {} ({}/{} signatures)",
            proposal_id, caller, signature_count, treasury.threshold
        );
        Ok(signature_count)
    }

    /// Execute a proposal, debiting its treasury and returning the released
    /// amount.
    ///
    /// Requires, in this order: the proposal is Pending, the treasury is
    /// not frozen, the time lock has elapsed, the signature count meets the
    /// threshold, and the balance covers the amount. Any caller may
    /// execute; the approvals were gathered when signing.
    pub fn execute_proposal(
        &self,
        caller: Address,
        treasury_id: TreasuryId,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> TreasuryResult<Amount> {
        let treasury_slot = self.ledger.treasury(treasury_id)?;
        let proposal_slot = self.ledger.proposal(proposal_id)?;
        let mut treasury = treasury_slot.write();
        let mut proposal = proposal_slot.write();

        if proposal.treasury_id != treasury_id {
            return Err(TreasuryError::NotAuthorized);
        }
        proposal.ensure_pending()?;
        if treasury.is_frozen {
            return Err(TreasuryError::Frozen);
        }
        if now < proposal.time_locked_until {
            return Err(TreasuryError::TimeLockActive);
        }
        if proposal.signature_count() < treasury.threshold {
            return Err(TreasuryError::InsufficientSignatures);
        }

        let amount = proposal.amount;
        treasury.release(amount)?;
        proposal.mark_executed()?;
        self.events
            .append(TreasuryEvent::ProposalExecuted { proposal_id, amount });
        info!(
            "proposal {} executed by {}, releasing {} from {}",
            proposal_id, caller, amount, treasury_id
        );
        Ok(amount)
    }

    /// Cancel a pending proposal. Only its creator may cancel.
    pub fn cancel_proposal(&self, caller: Address, proposal_id: ProposalId) -> TreasuryResult<()> {
        let slot = self.ledger.proposal(proposal_id)?;
        let mut proposal = slot.write();
        proposal.cancel(&caller)?;
        info!("proposal {} cancelled by its creator", proposal_id);
        Ok(())
    }

    /// Create an empty policy manager for a treasury.
    pub fn create_policy_manager(
        &self,
        treasury_id: TreasuryId,
    ) -> TreasuryResult<PolicyManagerId> {
        // The back-reference must resolve at creation time
        self.ledger.treasury(treasury_id)?;
        let manager_id = self
            .ledger
            .insert_policy_manager(PolicyManager::new(treasury_id));
        info!("policy manager {} created for {}", manager_id, treasury_id);
        Ok(manager_id)
    }

    /// Store a spending limit for a category, replacing any previous one.
    pub fn add_spending_limit(
        &self,
        manager_id: PolicyManagerId,
        category: String,
        daily_limit: Amount,
        weekly_limit: Amount,
        monthly_limit: Amount,
        per_transaction_limit: Amount,
    ) -> TreasuryResult<()> {
        let slot = self.ledger.policy_manager(manager_id)?;
        let mut manager = slot.write();
        info!(
            "spending limit for category '{}' stored on {}",
            category, manager_id
        );
        let policy = SpendingLimitPolicy {
            daily_limit,
            weekly_limit,
            monthly_limit,
            per_transaction_limit,
        };
        manager.add_spending_limit(category, policy);
        Ok(())
    }

    /// Store a whitelist for a category, replacing any previous one.
    pub fn add_whitelist(
        &self,
        manager_id: PolicyManagerId,
        category: String,
        addresses: Vec<Address>,
    ) -> TreasuryResult<()> {
        let slot = self.ledger.policy_manager(manager_id)?;
        let mut manager = slot.write();
        info!(
            "whitelist of {} recipients for category '{}' stored on {}",
            addresses.len(),
            category,
            manager_id
        );
        manager.add_whitelist(category, addresses);
        Ok(())
    }

    /// Create an emergency module for a treasury.
    pub fn create_emergency_module(
        &self,
        treasury_id: TreasuryId,
        emergency_signers: Vec<Address>,
        cooldown_period: u64,
    ) -> TreasuryResult<EmergencyModuleId> {
        self.ledger.treasury(treasury_id)?;
        let module = EmergencyModule::new(treasury_id, emergency_signers, cooldown_period);
        let module_id = self.ledger.insert_emergency_module(module);
        info!(
            "emergency module {} created for {} with cooldown of {}s",
            module_id, treasury_id, cooldown_period
        );
        Ok(module_id)
    }

    /// Withdraw directly through the emergency path, bypassing the
    /// proposal flow, and return the released amount.
    ///
    /// Membership plus an elapsed cooldown is the whole gate: no quorum
    /// against the stored supermajority threshold, no frozen check, and a
    /// zero amount is permitted (it still arms the cooldown).
    pub fn emergency_withdraw(
        &self,
        caller: Address,
        treasury_id: TreasuryId,
        module_id: EmergencyModuleId,
        amount: Amount,
        now: Timestamp,
    ) -> TreasuryResult<Amount> {
        let treasury_slot = self.ledger.treasury(treasury_id)?;
        let module_slot = self.ledger.emergency_module(module_id)?;
        let mut treasury = treasury_slot.write();
        let mut module = module_slot.write();

        if module.treasury_id != treasury_id {
            return Err(TreasuryError::NotAuthorized);
        }
        module.authorize_withdrawal(&caller, now)?;
        treasury.release(amount)?;
        module.record_withdrawal(now);
        self.events
            .append(TreasuryEvent::EmergencyWithdrawal { treasury_id, amount });
        info!(
            "emergency withdrawal of {} from {} by {}",
            amount, treasury_id, caller
        );
        Ok(amount)
    }

    /// Read-only copy of a treasury's current state.
    pub fn treasury(&self, id: TreasuryId) -> TreasuryResult<TreasuryAccount> {
        self.ledger.treasury_snapshot(id)
    }

    /// Read-only copy of a proposal's current state.
    pub fn proposal(&self, id: ProposalId) -> TreasuryResult<Proposal> {
        self.ledger.proposal_snapshot(id)
    }

    /// Read-only copy of a policy manager's current state.
    pub fn policy_manager(&self, id: PolicyManagerId) -> TreasuryResult<PolicyManager> {
        self.ledger.policy_manager_snapshot(id)
    }

    /// Read-only copy of an emergency module's current state.
    pub fn emergency_module(&self, id: EmergencyModuleId) -> TreasuryResult<EmergencyModule> {
        self.ledger.emergency_module_snapshot(id)
    }

    /// Every event emitted so far, in order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.events()
    }

    /// Events with a sequence number of at least `since`.
    pub fn events_since(&self, since: u64) -> Vec<EventRecord> {
        self.events.events_since(since)
    }
}

impl Default for TreasuryEngine {
    fn default() -> Self {
        TreasuryEngine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treasury::ProposalStatus;

    fn addr(n: u8) -> Address {
        Address::new([n; 32])
    }

    /// Three primary signers (1, 2, 3) with threshold 2, two emergency
    /// signers (10, 11), and a starting balance of 1000.
    fn funded_treasury(engine: &TreasuryEngine) -> TreasuryId {
        let treasury_id = engine
            .create_treasury(
                addr(1),
                "ops".to_string(),
                "USDC".to_string(),
                vec![addr(1), addr(2), addr(3)],
                2,
                vec![addr(10), addr(11)],
            )
            .unwrap();
        engine.deposit(treasury_id, 1000).unwrap();
        treasury_id
    }

    fn open_proposal(
        engine: &TreasuryEngine,
        treasury_id: TreasuryId,
        amount: Amount,
    ) -> ProposalId {
        engine
            .create_proposal(
                addr(1),
                treasury_id,
                "engineering".to_string(),
                addr(50),
                amount,
                0,
                "tooling".to_string(),
                0,
            )
            .unwrap()
    }

    #[test]
    fn create_treasury_validates_the_threshold() {
        let engine = TreasuryEngine::new();
        let result = engine.create_treasury(
            addr(1),
            "ops".to_string(),
            "USDC".to_string(),
            vec![addr(1), addr(2)],
            3,
            Vec::new(),
        );
        assert_eq!(result.unwrap_err(), TreasuryError::InvalidThreshold);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn operations_on_unknown_ids_fail() {
        let engine = TreasuryEngine::new();
        assert_eq!(
            engine.deposit(TreasuryId(1), 100).unwrap_err(),
            TreasuryError::UnknownEntity
        );
        assert_eq!(
            engine.cancel_proposal(addr(1), ProposalId(1)).unwrap_err(),
            TreasuryError::UnknownEntity
        );
        assert_eq!(
            engine.create_policy_manager(TreasuryId(9)).unwrap_err(),
            TreasuryError::UnknownEntity
        );
        assert_eq!(
            engine
                .create_emergency_module(TreasuryId(9), vec![addr(1)], 0)
                .unwrap_err(),
            TreasuryError::UnknownEntity
        );
    }

    #[test]
    fn only_primary_signers_may_sign() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);

        assert_eq!(
            engine
                .sign_proposal(addr(99), treasury_id, proposal_id)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
        // Emergency signers are not primary signers
        assert_eq!(
            engine
                .sign_proposal(addr(10), treasury_id, proposal_id)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );

        assert_eq!(
            engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap(),
            1
        );
        assert_eq!(
            engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap(),
            2
        );
        assert_eq!(
            engine
                .sign_proposal(addr(1), treasury_id, proposal_id)
                .unwrap_err(),
            TreasuryError::DuplicateSignature
        );
    }

    #[test]
    fn signing_against_the_wrong_treasury_fails() {
        let engine = TreasuryEngine::new();
        let treasury_a = funded_treasury(&engine);
        let treasury_b = engine
            .create_treasury(
                addr(1),
                "second".to_string(),
                "USDC".to_string(),
                vec![addr(1)],
                1,
                Vec::new(),
            )
            .unwrap();
        let proposal_id = open_proposal(&engine, treasury_a, 400);

        assert_eq!(
            engine
                .sign_proposal(addr(1), treasury_b, proposal_id)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
    }

    #[test]
    fn execution_requires_enough_signatures() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);

        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::InsufficientSignatures
        );

        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap(),
            400
        );

        let treasury = engine.treasury(treasury_id).unwrap();
        assert_eq!(treasury.balance, 600);
        assert_eq!(treasury.total_spent, 400);
        assert_eq!(
            engine.proposal(proposal_id).unwrap().status,
            ProposalStatus::Executed
        );

        // Executed is terminal
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
    }

    #[test]
    fn execution_waits_for_the_time_lock() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = engine
            .create_proposal(
                addr(1),
                treasury_id,
                "engineering".to_string(),
                addr(50),
                400,
                3600,
                "locked spend".to_string(),
                1000,
            )
            .unwrap();
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();

        assert_eq!(
            engine
                .execute_proposal(addr(3), treasury_id, proposal_id, 4599)
                .unwrap_err(),
            TreasuryError::TimeLockActive
        );
        assert_eq!(
            engine
                .execute_proposal(addr(3), treasury_id, proposal_id, 4600)
                .unwrap(),
            400
        );
    }

    #[test]
    fn execution_is_blocked_while_frozen_and_resumes_after_unfreeze() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();

        engine.freeze(addr(10), treasury_id).unwrap();
        // The frozen check precedes the time-lock and signature checks
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::Frozen
        );

        engine.unfreeze(addr(1), treasury_id).unwrap();
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap(),
            400
        );
    }

    #[test]
    fn the_pending_check_precedes_the_frozen_check() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);
        engine.cancel_proposal(addr(1), proposal_id).unwrap();
        engine.freeze(addr(10), treasury_id).unwrap();

        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
    }

    #[test]
    fn execution_fails_closed_when_the_balance_is_short() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 5000);
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();

        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::InsufficientBalance
        );

        // Nothing moved and the proposal is still pending
        let treasury = engine.treasury(treasury_id).unwrap();
        assert_eq!(treasury.balance, 1000);
        assert_eq!(treasury.total_spent, 0);
        assert_eq!(
            engine.proposal(proposal_id).unwrap().status,
            ProposalStatus::Pending
        );
    }

    #[test]
    fn executing_a_proposal_against_the_wrong_treasury_fails() {
        let engine = TreasuryEngine::new();
        let treasury_a = funded_treasury(&engine);
        let treasury_b = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_a, 400);
        engine.sign_proposal(addr(1), treasury_a, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_a, proposal_id).unwrap();

        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_b, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
        assert_eq!(engine.treasury(treasury_b).unwrap().balance, 1000);
    }

    #[test]
    fn cancelled_proposals_are_dead_ends() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();

        assert_eq!(
            engine.cancel_proposal(addr(2), proposal_id).unwrap_err(),
            TreasuryError::NotAuthorized
        );
        engine.cancel_proposal(addr(1), proposal_id).unwrap();

        assert_eq!(
            engine
                .sign_proposal(addr(2), treasury_id, proposal_id)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
        assert_eq!(engine.treasury(treasury_id).unwrap().balance, 1000);
    }

    #[test]
    fn proposal_count_tracks_creations() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        open_proposal(&engine, treasury_id, 100);
        open_proposal(&engine, treasury_id, 200);
        assert_eq!(engine.treasury(treasury_id).unwrap().proposal_count, 2);
    }

    #[test]
    fn emergency_withdrawal_respects_the_cooldown() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let module_id = engine
            .create_emergency_module(treasury_id, vec![addr(10), addr(11)], 3600)
            .unwrap();

        // last_emergency_time starts at zero, so the first call waits too
        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_id, module_id, 100, 1000)
                .unwrap_err(),
            TreasuryError::CooldownActive
        );

        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_id, module_id, 100, 4000)
                .unwrap(),
            100
        );

        // Immediately again, regardless of amount
        assert_eq!(
            engine
                .emergency_withdraw(addr(11), treasury_id, module_id, 1, 4001)
                .unwrap_err(),
            TreasuryError::CooldownActive
        );

        assert_eq!(
            engine
                .emergency_withdraw(addr(11), treasury_id, module_id, 50, 7600)
                .unwrap(),
            50
        );
        assert_eq!(
            engine.emergency_module(module_id).unwrap().last_emergency_time,
            7600
        );

        let treasury = engine.treasury(treasury_id).unwrap();
        assert_eq!(treasury.balance, 850);
        assert_eq!(treasury.total_spent, 150);
    }

    #[test]
    fn emergency_withdrawal_ignores_the_frozen_flag() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let module_id = engine
            .create_emergency_module(treasury_id, vec![addr(10)], 0)
            .unwrap();
        engine.freeze(addr(10), treasury_id).unwrap();

        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_id, module_id, 300, 50)
                .unwrap(),
            300
        );
        assert_eq!(engine.treasury(treasury_id).unwrap().balance, 700);
    }

    #[test]
    fn emergency_withdrawal_requires_module_membership() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let module_id = engine
            .create_emergency_module(treasury_id, vec![addr(10)], 0)
            .unwrap();

        // Primary signers are not emergency signers
        assert_eq!(
            engine
                .emergency_withdraw(addr(1), treasury_id, module_id, 100, 50)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
    }

    #[test]
    fn emergency_withdrawal_verifies_the_module_treasury_pair() {
        let engine = TreasuryEngine::new();
        let treasury_a = funded_treasury(&engine);
        let treasury_b = funded_treasury(&engine);
        let module_for_a = engine
            .create_emergency_module(treasury_a, vec![addr(10)], 0)
            .unwrap();

        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_b, module_for_a, 100, 50)
                .unwrap_err(),
            TreasuryError::NotAuthorized
        );
    }

    #[test]
    fn a_zero_emergency_withdrawal_still_arms_the_cooldown() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let module_id = engine
            .create_emergency_module(treasury_id, vec![addr(10)], 100)
            .unwrap();

        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_id, module_id, 0, 100)
                .unwrap(),
            0
        );
        assert_eq!(
            engine.emergency_module(module_id).unwrap().last_emergency_time,
            100
        );
        assert_eq!(
            engine
                .emergency_withdraw(addr(10), treasury_id, module_id, 10, 150)
                .unwrap_err(),
            TreasuryError::CooldownActive
        );
    }

    #[test]
    fn policies_are_stored_but_never_gate_execution() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let manager_id = engine.create_policy_manager(treasury_id).unwrap();

        // A whitelist that excludes the recipient and a cap the spend breaks
        engine
            .add_whitelist(manager_id, "engineering".to_string(), vec![addr(77)])
            .unwrap();
        engine
            .add_spending_limit(manager_id, "engineering".to_string(), 10, 10, 10, 10)
            .unwrap();

        let manager = engine.policy_manager(manager_id).unwrap();
        assert_eq!(
            manager
                .evaluate_spend("engineering", &addr(50), 400, 0)
                .unwrap_err(),
            TreasuryError::NotWhitelisted
        );

        // Execution pays no attention to any of it
        let proposal_id = open_proposal(&engine, treasury_id, 400);
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();
        assert_eq!(
            engine
                .execute_proposal(addr(1), treasury_id, proposal_id, 100)
                .unwrap(),
            400
        );
    }

    #[test]
    fn events_record_the_lifecycle_in_order() {
        let engine = TreasuryEngine::new();
        let treasury_id = funded_treasury(&engine);
        let proposal_id = open_proposal(&engine, treasury_id, 400);
        engine.sign_proposal(addr(1), treasury_id, proposal_id).unwrap();
        engine.sign_proposal(addr(2), treasury_id, proposal_id).unwrap();
        engine
            .execute_proposal(addr(3), treasury_id, proposal_id, 100)
            .unwrap();

        let events: Vec<TreasuryEvent> =
            engine.events().into_iter().map(|record| record.event).collect();
        assert_eq!(
            events,
            vec![
                TreasuryEvent::TreasuryCreated {
                    treasury_id,
                    creator: addr(1),
                    threshold: 2,
                },
                TreasuryEvent::ProposalCreated {
                    proposal_id,
                    amount: 400,
                },
                TreasuryEvent::ProposalSigned {
                    proposal_id,
                    signer: addr(1),
                    signature_count: 1,
                },
                TreasuryEvent::ProposalSigned {
                    proposal_id,
                    signer: addr(2),
                    signature_count: 2,
                },
                TreasuryEvent::ProposalExecuted {
                    proposal_id,
                    amount: 400,
                },
            ]
        );

        // Failures emit nothing
        let before = engine.events().len();
        let _ = engine.execute_proposal(addr(1), treasury_id, proposal_id, 100);
        assert_eq!(engine.events().len(), before);
    }
}
