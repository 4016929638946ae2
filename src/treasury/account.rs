use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{TreasuryError, TreasuryResult};
use crate::treasury::supermajority;
use crate::types::{Address, Amount};

/// The fund pool itself: the root of authority every other component
/// references by id.
///
/// One treasury holds exactly one asset. All debits go through
/// [`TreasuryAccount::release`], which is what keeps the balance
/// non-negative and `total_spent` equal to the sum of everything ever
/// released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryAccount {
    /// Human-readable name of the treasury.
    pub name: String,
    /// Asset the treasury denominates in, fixed at creation.
    pub asset: String,
    /// Primary signer set whose approvals count toward the threshold.
    pub signers: HashSet<Address>,
    /// Distinct approvals required before a proposal may execute.
    pub threshold: usize,
    /// Current balance in base units of `asset`.
    pub balance: Amount,
    /// Cumulative amount released through execution and emergency paths.
    pub total_spent: Amount,
    /// Number of proposals created against this treasury.
    pub proposal_count: u64,
    /// While set, deposits and normal execution are blocked.
    /// Emergency withdrawal is not.
    pub is_frozen: bool,
    /// Secondary signer set with authority to freeze the treasury.
    pub emergency_signers: HashSet<Address>,
    /// Supermajority of `emergency_signers`, computed once at creation.
    pub emergency_threshold: usize,
}

impl TreasuryAccount {
    /// Create a treasury with the given signer sets.
    ///
    /// Duplicate addresses collapse into the set before the threshold is
    /// validated, so a threshold can never exceed the number of distinct
    /// signers able to meet it.
    pub fn new(
        name: String,
        asset: String,
        signers: Vec<Address>,
        threshold: usize,
        emergency_signers: Vec<Address>,
    ) -> TreasuryResult<Self> {
        let signers: HashSet<Address> = signers.into_iter().collect();
        if signers.is_empty() || threshold == 0 || threshold > signers.len() {
            return Err(TreasuryError::InvalidThreshold);
        }

        let emergency_signers: HashSet<Address> = emergency_signers.into_iter().collect();
        let emergency_threshold = supermajority(emergency_signers.len());

        Ok(TreasuryAccount {
            name,
            asset,
            signers,
            threshold,
            balance: 0,
            total_spent: 0,
            proposal_count: 0,
            is_frozen: false,
            emergency_signers,
            emergency_threshold,
        })
    }

    /// Credit the balance. Blocked while frozen; the frozen check comes
    /// before the amount check.
    pub fn deposit(&mut self, amount: Amount) -> TreasuryResult<Amount> {
        if self.is_frozen {
            return Err(TreasuryError::Frozen);
        }
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TreasuryError::InvalidAmount)?;
        Ok(self.balance)
    }

    /// Set the frozen flag. Freezing requires emergency authority.
    pub fn freeze(&mut self, caller: &Address) -> TreasuryResult<()> {
        if !self.emergency_signers.contains(caller) {
            return Err(TreasuryError::NotAuthorized);
        }
        self.is_frozen = true;
        Ok(())
    }

    /// Clear the frozen flag. Unfreezing requires ordinary signer
    /// authority; the asymmetry with [`TreasuryAccount::freeze`] is
    /// intentional.
    pub fn unfreeze(&mut self, caller: &Address) -> TreasuryResult<()> {
        if !self.signers.contains(caller) {
            return Err(TreasuryError::NotAuthorized);
        }
        self.is_frozen = false;
        Ok(())
    }

    /// Debit `amount` and record it in `total_spent`.
    ///
    /// Fails without touching state when the balance does not cover the
    /// amount.
    pub fn release(&mut self, amount: Amount) -> TreasuryResult<()> {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                self.total_spent = self.total_spent.saturating_add(amount);
                Ok(())
            }
            None => Err(TreasuryError::InsufficientBalance),
        }
    }

    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    pub fn is_emergency_signer(&self, address: &Address) -> bool {
        self.emergency_signers.contains(address)
    }
}
