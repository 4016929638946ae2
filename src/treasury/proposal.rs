use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{TreasuryError, TreasuryResult};
use crate::types::{Address, Amount, Timestamp, TreasuryId};

/// Lifecycle state of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Collecting signatures; the only state that accepts transitions.
    Pending,
    /// Funds were released. Terminal.
    Executed,
    /// Abandoned by its creator. Terminal.
    Cancelled,
}

/// A single spend request tied to one treasury, accumulating signatures
/// until the treasury's threshold is met and the time lock has elapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Treasury this proposal draws from. A lookup key, never ownership.
    pub treasury_id: TreasuryId,
    /// Address that created the proposal; only it may cancel.
    pub creator: Address,
    /// Spending category label.
    pub category: String,
    /// Amount to release on execution, always greater than zero.
    pub amount: Amount,
    /// Address the funds are destined for.
    pub recipient: Address,
    /// Free-form description for reviewers.
    pub description: String,
    /// Signers that have approved. Appended to only while Pending.
    pub signatures: HashSet<Address>,
    /// Current lifecycle state.
    pub status: ProposalStatus,
    /// Earliest timestamp at which the proposal may execute.
    pub time_locked_until: Timestamp,
}

impl Proposal {
    /// Create a pending proposal whose time lock starts counting from `now`.
    pub fn new(
        treasury_id: TreasuryId,
        creator: Address,
        category: String,
        recipient: Address,
        amount: Amount,
        time_lock_duration: u64,
        description: String,
        now: Timestamp,
    ) -> TreasuryResult<Self> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }
        Ok(Proposal {
            treasury_id,
            creator,
            category,
            amount,
            recipient,
            description,
            signatures: HashSet::new(),
            status: ProposalStatus::Pending,
            time_locked_until: now.saturating_add(time_lock_duration),
        })
    }

    /// Fail unless the proposal is still Pending.
    ///
    /// A finalized proposal reports `NotAuthorized`; there is no distinct
    /// "already finalized" kind.
    pub fn ensure_pending(&self) -> TreasuryResult<()> {
        match self.status {
            ProposalStatus::Pending => Ok(()),
            ProposalStatus::Executed | ProposalStatus::Cancelled => {
                Err(TreasuryError::NotAuthorized)
            }
        }
    }

    /// Record one signer's approval, returning the new signature count.
    ///
    /// The caller is responsible for checking that the signer belongs to
    /// the treasury's primary signer set.
    pub fn record_signature(&mut self, signer: Address) -> TreasuryResult<usize> {
        self.ensure_pending()?;
        if !self.signatures.insert(signer) {
            return Err(TreasuryError::DuplicateSignature);
        }
        Ok(self.signatures.len())
    }

    /// Transition a pending proposal to Executed.
    pub fn mark_executed(&mut self) -> TreasuryResult<()> {
        match self.status {
            ProposalStatus::Pending => {
                self.status = ProposalStatus::Executed;
                Ok(())
            }
            ProposalStatus::Executed | ProposalStatus::Cancelled => {
                Err(TreasuryError::NotAuthorized)
            }
        }
    }

    /// Cancel a pending proposal. Only the creator may cancel; no funds
    /// move.
    pub fn cancel(&mut self, caller: &Address) -> TreasuryResult<()> {
        if *caller != self.creator {
            return Err(TreasuryError::NotAuthorized);
        }
        self.ensure_pending()?;
        self.status = ProposalStatus::Cancelled;
        Ok(())
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}
