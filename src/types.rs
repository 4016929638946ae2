use std::fmt;

use serde::{Deserialize, Serialize};

/// Amount of a treasury's asset, in indivisible base units.
pub type Amount = u64;

/// Seconds since the Unix epoch, supplied by the caller's clock.
pub type Timestamp = u64;

/// Stable identity of an already-authenticated principal.
///
/// The platform authenticates callers before they reach the treasury core;
/// an `Address` is the value it hands us, never a key we verify ourselves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// A fresh random address, for demo scenarios and tests.
    pub fn random() -> Self {
        Address(rand::random())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First four bytes are enough to tell test addresses apart in logs
        write!(f, "Address({}..)", hex::encode(&self.0[..4]))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`TreasuryAccount`](crate::treasury::TreasuryAccount).
    TreasuryId,
    "treasury"
);
entity_id!(
    /// Identifier of a [`Proposal`](crate::treasury::Proposal).
    ProposalId,
    "proposal"
);
entity_id!(
    /// Identifier of a [`PolicyManager`](crate::treasury::PolicyManager).
    PolicyManagerId,
    "policy-manager"
);
entity_id!(
    /// Identifier of an [`EmergencyModule`](crate::treasury::EmergencyModule).
    EmergencyModuleId,
    "emergency-module"
);
