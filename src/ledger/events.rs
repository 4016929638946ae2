//! Append-only event log for treasury state transitions.
//!
//! Events are emitted only after an operation's mutations have succeeded and
//! are never retried or replayed. External collaborators read the log; the
//! core never consults it when making decisions.

use std::fmt;

use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, ProposalId, Timestamp, TreasuryId};
use crate::utils::current_time;

/// An observable treasury state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryEvent {
    /// A new treasury was created.
    TreasuryCreated {
        treasury_id: TreasuryId,
        creator: Address,
        threshold: usize,
    },
    /// A spend proposal was created.
    ProposalCreated { proposal_id: ProposalId, amount: Amount },
    /// A signer added their approval to a proposal.
    ProposalSigned {
        proposal_id: ProposalId,
        signer: Address,
        signature_count: usize,
    },
    /// A proposal met its conditions and released funds.
    ProposalExecuted { proposal_id: ProposalId, amount: Amount },
    /// Funds were released through the emergency path.
    EmergencyWithdrawal { treasury_id: TreasuryId, amount: Amount },
    /// A treasury was frozen by an emergency signer.
    TreasuryFrozen { treasury_id: TreasuryId },
}

impl fmt::Display for TreasuryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreasuryEvent::TreasuryCreated {
                treasury_id,
                creator,
                threshold,
            } => write!(
                f,
                "TREASURY_CREATED {} creator={} threshold={}",
                treasury_id, creator, threshold
            ),
            TreasuryEvent::ProposalCreated { proposal_id, amount } => {
                write!(f, "PROPOSAL_CREATED {} amount={}", proposal_id, amount)
            }
            TreasuryEvent::ProposalSigned {
                proposal_id,
                signer,
                signature_count,
            } => write!(
                f,
                "PROPOSAL_SIGNED {} signer={} signatures={}",
                proposal_id, signer, signature_count
            ),
            TreasuryEvent::ProposalExecuted { proposal_id, amount } => {
                write!(f, "PROPOSAL_EXECUTED {} amount={}", proposal_id, amount)
            }
            TreasuryEvent::EmergencyWithdrawal { treasury_id, amount } => {
                write!(f, "EMERGENCY_WITHDRAWAL {} amount={}", treasury_id, amount)
            }
            TreasuryEvent::TreasuryFrozen { treasury_id } => {
                write!(f, "TREASURY_FROZEN {}", treasury_id)
            }
        }
    }
}

/// A single entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0 and strictly increasing.
    pub sequence: u64,
    /// Wall-clock time the record was appended, seconds since the epoch.
    pub timestamp: Timestamp,
    /// The transition that occurred.
    pub event: TreasuryEvent,
}

/// In-process append-only store of [`EventRecord`]s.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an event, returning the sequence number it was stored under.
    pub fn append(&self, event: TreasuryEvent) -> u64 {
        let mut entries = self.entries.lock();
        let sequence = entries.len() as u64;
        info!("event #{}: {}", sequence, event);
        entries.push(EventRecord {
            sequence,
            timestamp: current_time(),
            event,
        });
        sequence
    }

    /// Snapshot of every record appended so far, in order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.entries.lock().clone()
    }

    /// Snapshot of the records with `sequence >= since`, in order.
    pub fn events_since(&self, since: u64) -> Vec<EventRecord> {
        let entries = self.entries.lock();
        entries
            .iter()
            .filter(|record| record.sequence >= since)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(n: u64) -> TreasuryEvent {
        TreasuryEvent::ProposalCreated {
            proposal_id: ProposalId(n),
            amount: 100 * n,
        }
    }

    #[test]
    fn append_assigns_increasing_sequences() {
        let log = EventLog::new();
        assert_eq!(log.append(sample_event(1)), 0);
        assert_eq!(log.append(sample_event(2)), 1);
        assert_eq!(log.append(sample_event(3)), 2);

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[test]
    fn events_since_filters_by_sequence() {
        let log = EventLog::new();
        for n in 0..5 {
            log.append(sample_event(n));
        }

        let tail = log.events_since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 3);
        assert_eq!(tail[1].sequence, 4);

        assert!(log.events_since(5).is_empty());
    }

    #[test]
    fn records_round_trip_through_json() {
        let log = EventLog::new();
        log.append(TreasuryEvent::TreasuryCreated {
            treasury_id: TreasuryId(1),
            creator: Address::new([7; 32]),
            threshold: 2,
        });

        let record = &log.events()[0];
        let json = serde_json::to_string(record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(*record, back);
    }
}
