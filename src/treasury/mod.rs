//! The treasury core: fund pools, quorum-gated spend proposals, category
//! policies and the cooldown-gated emergency bypass path.

pub mod account;
pub mod emergency;
pub mod engine;
pub mod policy;
pub mod proposal;

pub use account::TreasuryAccount;
pub use emergency::EmergencyModule;
pub use engine::TreasuryEngine;
pub use policy::{PolicyManager, SpendingLimitPolicy, SpendingTracker, WhitelistPolicy};
pub use proposal::{Proposal, ProposalStatus};

/// Supermajority threshold over a signer set: `floor(3n/4) + 1`.
///
/// Used for a treasury's stored emergency threshold and for an emergency
/// module's quorum field. Note the emergency withdrawal path authorizes on
/// single-signer membership, not on this value.
pub fn supermajority(signer_count: usize) -> usize {
    (signer_count * 3) / 4 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supermajority_is_three_quarters_plus_one() {
        assert_eq!(supermajority(0), 1);
        assert_eq!(supermajority(1), 1);
        assert_eq!(supermajority(2), 2);
        assert_eq!(supermajority(3), 3);
        assert_eq!(supermajority(4), 4);
        assert_eq!(supermajority(5), 4);
        assert_eq!(supermajority(8), 7);
        assert_eq!(supermajority(100), 76);
    }
}
