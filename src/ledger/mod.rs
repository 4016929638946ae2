//! In-memory entity registry standing in for the platform's record store.
//!
//! Each entity lives behind its own lock so that every operation holds
//! exclusive access to exactly the entities it touches for the duration of
//! the call. Identifiers are allocated here and are never reused; dependent
//! entities hold ids, never owning references.

pub mod events;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{TreasuryError, TreasuryResult};
use crate::treasury::{EmergencyModule, PolicyManager, Proposal, TreasuryAccount};
use crate::types::{EmergencyModuleId, PolicyManagerId, ProposalId, TreasuryId};

/// A registry slot: one lock per entity.
pub(crate) type Slot<T> = Arc<RwLock<T>>;

fn alloc(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

/// Registry of all treasury entities, addressable by id.
#[derive(Debug, Default)]
pub struct Ledger {
    next_treasury_id: AtomicU64,
    next_proposal_id: AtomicU64,
    next_policy_manager_id: AtomicU64,
    next_emergency_module_id: AtomicU64,
    treasuries: RwLock<HashMap<TreasuryId, Slot<TreasuryAccount>>>,
    proposals: RwLock<HashMap<ProposalId, Slot<Proposal>>>,
    policy_managers: RwLock<HashMap<PolicyManagerId, Slot<PolicyManager>>>,
    emergency_modules: RwLock<HashMap<EmergencyModuleId, Slot<EmergencyModule>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub(crate) fn insert_treasury(&self, account: TreasuryAccount) -> TreasuryId {
        let id = TreasuryId(alloc(&self.next_treasury_id));
        self.treasuries
            .write()
            .insert(id, Arc::new(RwLock::new(account)));
        id
    }

    pub(crate) fn insert_proposal(&self, proposal: Proposal) -> ProposalId {
        let id = ProposalId(alloc(&self.next_proposal_id));
        self.proposals
            .write()
            .insert(id, Arc::new(RwLock::new(proposal)));
        id
    }

    pub(crate) fn insert_policy_manager(&self, manager: PolicyManager) -> PolicyManagerId {
        let id = PolicyManagerId(alloc(&self.next_policy_manager_id));
        self.policy_managers
            .write()
            .insert(id, Arc::new(RwLock::new(manager)));
        id
    }

    pub(crate) fn insert_emergency_module(&self, module: EmergencyModule) -> EmergencyModuleId {
        let id = EmergencyModuleId(alloc(&self.next_emergency_module_id));
        self.emergency_modules
            .write()
            .insert(id, Arc::new(RwLock::new(module)));
        id
    }

    pub(crate) fn treasury(&self, id: TreasuryId) -> TreasuryResult<Slot<TreasuryAccount>> {
        self.treasuries
            .read()
            .get(&id)
            .cloned()
            .ok_or(TreasuryError::UnknownEntity)
    }

    pub(crate) fn proposal(&self, id: ProposalId) -> TreasuryResult<Slot<Proposal>> {
        self.proposals
            .read()
            .get(&id)
            .cloned()
            .ok_or(TreasuryError::UnknownEntity)
    }

    pub(crate) fn policy_manager(
        &self,
        id: PolicyManagerId,
    ) -> TreasuryResult<Slot<PolicyManager>> {
        self.policy_managers
            .read()
            .get(&id)
            .cloned()
            .ok_or(TreasuryError::UnknownEntity)
    }

    pub(crate) fn emergency_module(
        &self,
        id: EmergencyModuleId,
    ) -> TreasuryResult<Slot<EmergencyModule>> {
        self.emergency_modules
            .read()
            .get(&id)
            .cloned()
            .ok_or(TreasuryError::UnknownEntity)
    }

    /// Read-only copy of a treasury's current state.
    pub fn treasury_snapshot(&self, id: TreasuryId) -> TreasuryResult<TreasuryAccount> {
        Ok(self.treasury(id)?.read().clone())
    }

    /// Read-only copy of a proposal's current state.
    pub fn proposal_snapshot(&self, id: ProposalId) -> TreasuryResult<Proposal> {
        Ok(self.proposal(id)?.read().clone())
    }

    /// Read-only copy of a policy manager's current state.
    pub fn policy_manager_snapshot(&self, id: PolicyManagerId) -> TreasuryResult<PolicyManager> {
        Ok(self.policy_manager(id)?.read().clone())
    }

    /// Read-only copy of an emergency module's current state.
    pub fn emergency_module_snapshot(
        &self,
        id: EmergencyModuleId,
    ) -> TreasuryResult<EmergencyModule> {
        Ok(self.emergency_module(id)?.read().clone())
    }
}
