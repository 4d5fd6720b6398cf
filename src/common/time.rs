//! Time-related utilities with clock abstraction for testability.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Controllable clock for testing: starts at a fixed time and can be
/// advanced manually.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(fixed_time_millis),
        }
    }

    /// Move the clock forward by the given number of milliseconds
    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format
pub fn millis_to_rfc3339(timestamp_millis: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        // テスト項目: FixedClock が手動で進められる
        // given (前提条件):
        let clock = FixedClock::new(1_000);

        // when (操作):
        clock.advance(45_000);

        // then (期待する結果):
        assert_eq!(clock.now_millis(), 46_000);
    }

    #[test]
    fn test_millis_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプが RFC 3339 形式に変換される
        // given (前提条件):
        let millis = 1_700_000_000_000;

        // when (操作):
        let rendered = millis_to_rfc3339(millis);

        // then (期待する結果):
        assert!(rendered.starts_with("2023-11-14T"));
    }
}
