//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in UTC (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_unix_timestamp_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_unix_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a millisecond Unix timestamp into fractional seconds.
///
/// Upstream sources report timestamps in milliseconds while display clients
/// work in seconds.
pub fn millis_to_secs(timestamp_millis: i64) -> f64 {
    timestamp_millis as f64 / 1000.0
}

/// Convert Unix timestamp (milliseconds) to UTC RFC 3339 format
///
/// Returns `None` when the timestamp is outside chrono's representable range.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis).map(|dt| dt.to_rfc3339())
}
