//! Pure rate-state transition rules
//!
//! All functions take explicit `now` timestamps (milliseconds on the
//! governor's own monotonic clock), so every transition is testable as
//! plain arithmetic.

use crate::config::GovernorConfig;

/// Mutable admission state for one source.
///
/// Owned exclusively by that source's [`RateGovernor`](crate::RateGovernor);
/// adapters never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateState {
    /// Call slots left in the current interval
    pub tokens_remaining: u32,

    /// When the bucket next refills
    pub reset_at: u64,

    /// Rate-limit responses since the last success
    pub consecutive_failures: u32,

    /// No calls admitted before this instant
    pub backoff_until: u64,
}

impl RateState {
    /// A full bucket starting its first interval at `now`.
    pub fn fresh(config: &GovernorConfig, now: u64) -> Self {
        Self {
            tokens_remaining: config.capacity,
            reset_at: now + config.refill_interval_ms,
            consecutive_failures: 0,
            backoff_until: 0,
        }
    }

    /// Refill the bucket if the interval has elapsed.
    pub fn refill(&mut self, config: &GovernorConfig, now: u64) {
        if now >= self.reset_at {
            self.tokens_remaining = config.capacity;
            self.reset_at = now + config.refill_interval_ms;
        }
    }

    /// Take a token if one is available and no backoff is in force.
    pub fn try_take(&mut self, now: u64) -> bool {
        if now < self.backoff_until || self.tokens_remaining == 0 {
            return false;
        }
        self.tokens_remaining -= 1;
        true
    }

    /// Earliest instant at which `try_take` could next succeed.
    pub fn next_ready_at(&self, now: u64) -> u64 {
        let token_ready = if self.tokens_remaining > 0 {
            now
        } else {
            self.reset_at
        };
        token_ready.max(self.backoff_until)
    }

    /// A successful call resets the failure streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// A rate-limit response zeroes the bucket and pushes `backoff_until`
    /// out exponentially. `jitter` is a signed fraction in
    /// `[-jitter_frac, +jitter_frac]`, already sampled by the caller.
    pub fn record_rate_limited(&mut self, config: &GovernorConfig, jitter: f64, now: u64) {
        self.consecutive_failures += 1;
        self.tokens_remaining = 0;

        let delay = backoff_delay_ms(
            config.backoff_base_ms,
            config.backoff_cap_ms,
            self.consecutive_failures,
        );
        let jittered = (delay as f64 * (1.0 + jitter)).max(0.0) as u64;
        self.backoff_until = now + jittered;
    }
}

/// Un-jittered backoff delay for the nth consecutive failure: base doubled
/// per failure, capped.
pub fn backoff_delay_ms(base_ms: u64, cap_ms: u64, consecutive_failures: u32) -> u64 {
    if consecutive_failures == 0 {
        return 0;
    }
    let exponent = (consecutive_failures - 1).min(20);
    base_ms.saturating_mul(1u64 << exponent).min(cap_ms)
}
