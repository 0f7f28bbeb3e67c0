//! Opt-in reconnect-with-backoff policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Exponential backoff between reconnect attempts.
///
/// The attempt counter resets after every successful handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before reconnect attempt `attempt` (zero-based), or `None` once
    /// the attempts are used up.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2_u64.saturating_pow(attempt);
        let delay = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Some(Duration::from_millis(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_until_capped() {
        let policy = ReconnectPolicy {
            max_attempts: 10,
            initial_delay_ms: 100,
            max_delay_ms: 1_000,
        };
        assert_eq!(policy.delay_for(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_millis(800)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_millis(1_000)));
        assert_eq!(policy.delay_for(9), Some(Duration::from_millis(1_000)));
    }

    #[test]
    fn attempts_are_bounded() {
        let policy = ReconnectPolicy::with_max_attempts(2);
        assert!(policy.delay_for(1).is_some());
        assert!(policy.delay_for(2).is_none());
        assert!(ReconnectPolicy::with_max_attempts(0).delay_for(0).is_none());
    }

    #[test]
    fn large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy::with_max_attempts(u32::MAX);
        assert_eq!(
            policy.delay_for(200),
            Some(Duration::from_millis(DEFAULT_MAX_DELAY_MS))
        );
    }
}
