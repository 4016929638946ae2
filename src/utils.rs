use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Get the current time in seconds since the Unix epoch.
///
/// Core operations never call this themselves; they take `now` as an
/// argument so that time-lock and cooldown comparisons are driven by the
/// caller's clock. This is the clock the demo binary and the event log use.
pub fn current_time() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Calculate the time elapsed since a given timestamp.
///
/// Returns 0 if the timestamp is in the future.
pub fn time_since(timestamp: Timestamp) -> u64 {
    let now = current_time();
    now.saturating_sub(timestamp)
}
