pub mod errors;
pub mod ledger;
pub mod treasury;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use errors::{TreasuryError, TreasuryResult};
pub use ledger::events::{EventLog, EventRecord, TreasuryEvent};
pub use ledger::Ledger;
pub use treasury::{
    EmergencyModule, PolicyManager, Proposal, ProposalStatus, SpendingLimitPolicy,
    SpendingTracker, TreasuryAccount, TreasuryEngine, WhitelistPolicy,
};
pub use types::{
    Address, Amount, EmergencyModuleId, PolicyManagerId, ProposalId, Timestamp, TreasuryId,
};
