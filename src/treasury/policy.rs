//! Per-category spending policies and rolling spend trackers.
//!
//! Policies are recorded and can be evaluated on request, but no execution
//! path consults them: proposal execution and emergency withdrawal move
//! funds without asking the policy manager. Evaluation exists for external
//! collaborators that want to check a spend against the recorded rules.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{TreasuryError, TreasuryResult};
use crate::types::{Address, Amount, Timestamp, TreasuryId};

/// Length of the daily spending window in seconds.
pub const DAY_SECS: u64 = 86_400;
/// Length of the weekly spending window in seconds.
pub const WEEK_SECS: u64 = 604_800;
/// Length of the monthly spending window in seconds, a flat 30 days.
pub const MONTH_SECS: u64 = 2_592_000;

/// Caps on spending within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingLimitPolicy {
    /// Cap on the total spent within one daily window.
    pub daily_limit: Amount,
    /// Cap on the total spent within one weekly window.
    pub weekly_limit: Amount,
    /// Cap on the total spent within one monthly window.
    pub monthly_limit: Amount,
    /// Cap on any single spend.
    pub per_transaction_limit: Amount,
}

/// Allowed recipients for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistPolicy {
    /// Recipients a spend in this category may target.
    pub allowed_recipients: HashSet<Address>,
    /// When false the whitelist is recorded but does not reject anyone.
    pub enabled: bool,
}

/// Rolling spend counters for one category. Pure bookkeeping; the tracker
/// makes no policy decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingTracker {
    /// Total recorded within the current daily window.
    pub daily_spent: Amount,
    /// Total recorded within the current weekly window.
    pub weekly_spent: Amount,
    /// Total recorded within the current monthly window.
    pub monthly_spent: Amount,
    /// Index of the daily window the counter belongs to.
    pub last_day: u64,
    /// Index of the weekly window the counter belongs to.
    pub last_week: u64,
    /// Index of the monthly window the counter belongs to.
    pub last_month: u64,
}

impl SpendingTracker {
    pub fn new() -> Self {
        SpendingTracker::default()
    }

    /// Reset any counter whose window has rolled past `now`.
    ///
    /// The three windows roll independently: a new day resets only the
    /// daily counter unless the week or month boundary was crossed too.
    pub fn roll_over(&mut self, now: Timestamp) {
        let day = now / DAY_SECS;
        if day != self.last_day {
            self.daily_spent = 0;
            self.last_day = day;
        }
        let week = now / WEEK_SECS;
        if week != self.last_week {
            self.weekly_spent = 0;
            self.last_week = week;
        }
        let month = now / MONTH_SECS;
        if month != self.last_month {
            self.monthly_spent = 0;
            self.last_month = month;
        }
    }

    /// Add a spend to all three windows, rolling each over first.
    pub fn record(&mut self, amount: Amount, now: Timestamp) {
        self.roll_over(now);
        self.daily_spent = self.daily_spent.saturating_add(amount);
        self.weekly_spent = self.weekly_spent.saturating_add(amount);
        self.monthly_spent = self.monthly_spent.saturating_add(amount);
    }

    /// Counter values as they would stand at `now`, without mutating.
    ///
    /// A counter whose window has rolled past reads as zero.
    pub fn effective(&self, now: Timestamp) -> (Amount, Amount, Amount) {
        let daily = if now / DAY_SECS == self.last_day {
            self.daily_spent
        } else {
            0
        };
        let weekly = if now / WEEK_SECS == self.last_week {
            self.weekly_spent
        } else {
            0
        };
        let monthly = if now / MONTH_SECS == self.last_month {
            self.monthly_spent
        } else {
            0
        };
        (daily, weekly, monthly)
    }
}

/// Per-category spending rules for one treasury: at most one limit policy,
/// one whitelist, and one tracker per category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyManager {
    /// Treasury these policies describe. A lookup key, never ownership.
    pub treasury_id: TreasuryId,
    /// Category name to spending caps.
    pub spending_limits: HashMap<String, SpendingLimitPolicy>,
    /// Category name to allowed recipients.
    pub whitelists: HashMap<String, WhitelistPolicy>,
    /// Category name to rolling spend counters.
    pub trackers: HashMap<String, SpendingTracker>,
}

impl PolicyManager {
    pub fn new(treasury_id: TreasuryId) -> Self {
        PolicyManager {
            treasury_id,
            spending_limits: HashMap::new(),
            whitelists: HashMap::new(),
            trackers: HashMap::new(),
        }
    }

    /// Store a spending limit for `category`, fully replacing any previous
    /// one. The category's tracker keeps its counters; a zeroed tracker is
    /// installed only when none exists yet.
    pub fn add_spending_limit(&mut self, category: String, policy: SpendingLimitPolicy) {
        self.trackers.entry(category.clone()).or_default();
        self.spending_limits.insert(category, policy);
    }

    /// Store a whitelist for `category`, enabled, fully replacing any
    /// previous one.
    pub fn add_whitelist(&mut self, category: String, addresses: Vec<Address>) {
        let policy = WhitelistPolicy {
            allowed_recipients: addresses.into_iter().collect(),
            enabled: true,
        };
        self.whitelists.insert(category, policy);
    }

    /// Check a prospective spend against the recorded rules for its
    /// category without recording anything.
    ///
    /// Categories with no recorded policy pass. The whitelist is checked
    /// first, then the per-transaction cap, then each rolling window with
    /// the spend projected onto it.
    pub fn evaluate_spend(
        &self,
        category: &str,
        recipient: &Address,
        amount: Amount,
        now: Timestamp,
    ) -> TreasuryResult<()> {
        if let Some(whitelist) = self.whitelists.get(category) {
            if whitelist.enabled && !whitelist.allowed_recipients.contains(recipient) {
                return Err(TreasuryError::NotWhitelisted);
            }
        }

        if let Some(limit) = self.spending_limits.get(category) {
            if amount > limit.per_transaction_limit {
                return Err(TreasuryError::SpendingLimitExceeded);
            }
            let (daily, weekly, monthly) = self
                .trackers
                .get(category)
                .map(|tracker| tracker.effective(now))
                .unwrap_or((0, 0, 0));
            if daily.saturating_add(amount) > limit.daily_limit
                || weekly.saturating_add(amount) > limit.weekly_limit
                || monthly.saturating_add(amount) > limit.monthly_limit
            {
                return Err(TreasuryError::SpendingLimitExceeded);
            }
        }

        Ok(())
    }

    /// Record a spend against the category's rolling counters.
    pub fn record_spend(&mut self, category: &str, amount: Amount, now: Timestamp) {
        self.trackers
            .entry(category.to_string())
            .or_default()
            .record(amount, now);
    }
}
