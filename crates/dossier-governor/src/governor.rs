//! Async admission control over the pure rate state

use crate::config::GovernorConfig;
use crate::error::GovernorError;
use crate::state::RateState;
use dossier_domain::SourceId;
use rand::Rng;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a call, as reported back by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The call succeeded (or answered "nothing found")
    Success,

    /// The source throttled the call
    RateLimited,

    /// The source presented a CAPTCHA or anti-bot interstitial
    Blocked,
}

/// Per-source admission controller.
///
/// One instance per source, shared by all concurrent callers. Waiting is
/// cooperative: a caller parked on one source's governor never holds up
/// callers of another source.
pub struct RateGovernor {
    source: SourceId,
    config: GovernorConfig,
    epoch: Instant,
    inner: Mutex<Inner>,
}

struct Inner {
    state: RateState,
    blocked: bool,
}

impl RateGovernor {
    /// Create a governor with a full bucket.
    pub fn new(source: SourceId, config: GovernorConfig) -> Self {
        let inner = Inner {
            state: RateState::fresh(&config, 0),
            blocked: false,
        };
        Self {
            source,
            config,
            epoch: Instant::now(),
            inner: Mutex::new(inner),
        }
    }

    /// The source this governor controls.
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Milliseconds on this governor's own monotonic clock.
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Wait for a call slot, or fail when the deadline elapses or the
    /// source is blocked.
    ///
    /// Fails fast when the next possible slot already lies beyond the
    /// deadline, so a backed-off source cannot stall the investigation.
    pub async fn acquire(&self, deadline: Instant) -> Result<(), GovernorError> {
        loop {
            let ready_at_ms = {
                let mut inner = self.inner.lock().expect("governor lock poisoned");
                if inner.blocked {
                    return Err(GovernorError::SourceUnavailable(self.source));
                }

                let now = self.now_ms();
                inner.state.refill(&self.config, now);
                if inner.state.try_take(now) {
                    return Ok(());
                }
                inner.state.next_ready_at(now)
            };

            let wake = self.epoch + Duration::from_millis(ready_at_ms);
            if wake > deadline {
                tracing::debug!(
                    source = %self.source,
                    "no call slot before deadline, giving up"
                );
                return Err(GovernorError::DeadlineElapsed(self.source));
            }
            tokio::time::sleep_until(wake).await;
        }
    }

    /// Feed a call outcome back into the rate state.
    pub fn report_outcome(&self, outcome: Outcome) {
        let mut inner = self.inner.lock().expect("governor lock poisoned");
        match outcome {
            Outcome::Success => inner.state.record_success(),
            Outcome::RateLimited => {
                let jitter = rand::thread_rng()
                    .gen_range(-self.config.jitter_frac..=self.config.jitter_frac);
                let now = self.now_ms();
                inner.state.record_rate_limited(&self.config, jitter, now);
                tracing::warn!(
                    source = %self.source,
                    failures = inner.state.consecutive_failures,
                    backoff_until_ms = inner.state.backoff_until,
                    "rate limited, backing off"
                );
            }
            Outcome::Blocked => {
                inner.blocked = true;
                tracing::warn!(
                    source = %self.source,
                    "source blocked, disabled for the rest of the investigation"
                );
            }
        }
    }

    /// Whether the source has been blocked for this investigation.
    pub fn is_blocked(&self) -> bool {
        self.inner.lock().expect("governor lock poisoned").blocked
    }

    /// Snapshot of the current rate state (for logs and tests).
    pub fn state(&self) -> RateState {
        self.inner.lock().expect("governor lock poisoned").state
    }
}
