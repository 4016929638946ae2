use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{TreasuryError, TreasuryResult};
use crate::treasury::supermajority;
use crate::types::{Address, Timestamp, TreasuryId};

/// The emergency bypass path for one treasury.
///
/// Withdrawal through this module skips the proposal flow entirely: any
/// single emergency signer may withdraw once the cooldown has elapsed. The
/// stored supermajority threshold is not consulted on that path, and a
/// frozen treasury does not block it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyModule {
    /// Treasury this module can draw from. A lookup key, never ownership.
    pub treasury_id: TreasuryId,
    /// Addresses allowed to use the emergency path. May overlap the
    /// treasury's primary signers.
    pub emergency_signers: HashSet<Address>,
    /// Supermajority of `emergency_signers`, computed once at creation.
    pub super_majority_threshold: usize,
    /// Minimum seconds between two emergency withdrawals.
    pub cooldown_period: u64,
    /// Timestamp of the most recent emergency withdrawal, 0 when none has
    /// happened yet. With the zero start, the first withdrawal is itself
    /// gated until `now >= cooldown_period`.
    pub last_emergency_time: Timestamp,
}

impl EmergencyModule {
    pub fn new(
        treasury_id: TreasuryId,
        emergency_signers: Vec<Address>,
        cooldown_period: u64,
    ) -> Self {
        let emergency_signers: HashSet<Address> = emergency_signers.into_iter().collect();
        let super_majority_threshold = supermajority(emergency_signers.len());
        EmergencyModule {
            treasury_id,
            emergency_signers,
            super_majority_threshold,
            cooldown_period,
            last_emergency_time: 0,
        }
    }

    /// Gate a withdrawal on signer membership and the cooldown. Does not
    /// mutate; call [`EmergencyModule::record_withdrawal`] once the funds
    /// have actually been released.
    pub fn authorize_withdrawal(&self, caller: &Address, now: Timestamp) -> TreasuryResult<()> {
        if !self.emergency_signers.contains(caller) {
            return Err(TreasuryError::NotAuthorized);
        }
        if now.saturating_sub(self.last_emergency_time) < self.cooldown_period {
            return Err(TreasuryError::CooldownActive);
        }
        Ok(())
    }

    /// Arm the cooldown after a successful withdrawal.
    pub fn record_withdrawal(&mut self, now: Timestamp) {
        self.last_emergency_time = now;
    }
}
