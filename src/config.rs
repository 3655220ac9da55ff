//! Game rules and retry policy.

use std::time::Duration;

/// Seconds each image stays on screen.
pub const DEFAULT_REVEAL_SECONDS: u32 = 15;

/// Seconds allowed for answering in timed mode.
pub const DEFAULT_ANSWER_SECONDS: u32 = 30;

/// Timing rules the session state machine runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    /// Countdown units each image is shown for.
    pub reveal_seconds: u32,
    /// Countdown units allowed for answering in timed mode.
    pub answer_seconds: u32,
    /// Wall-clock length of one countdown unit.
    pub time_unit: Duration,
    pub retry: RetryPolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            reveal_seconds: DEFAULT_REVEAL_SECONDS,
            answer_seconds: DEFAULT_ANSWER_SECONDS,
            time_unit: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

/// How failed quiz fetches are retried.
///
/// `max_attempts: None` retries forever. Delays double from `base_delay`
/// up to `max_delay`; the first attempt is never delayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// No delay at all between attempts.
    pub fn immediate() -> Self {
        Self {
            max_attempts: None,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Whether attempt number `attempt` (1-based) may still be issued.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }

    /// Delay to wait before issuing attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}
