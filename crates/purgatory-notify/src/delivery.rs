//! How hard a sink tries before giving up on a notice.
//!
//! Notices are sent from inside the call that recorded a session's first
//! attempt, so every pause between sends is charged against one fixed
//! budget. A `retry-after` that does not fit in what is left ends delivery
//! instead of being shortened.

use std::time::Duration;

use purgatory_types::NotifyError;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Total sends, including the first. `1` disables resending.
    pub max_sends: u32,
    /// Upper bound of the first random pause; doubles after each failed send.
    pub base_pause: Duration,
    /// Total time that may be spent pausing for one notice.
    pub budget: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_sends: 3,
            base_pause: Duration::from_millis(250),
            budget: Duration::from_secs(5),
        }
    }
}

impl DeliveryPolicy {
    /// Send once and report the outcome.
    pub fn single_send() -> Self {
        Self {
            max_sends: 1,
            ..Self::default()
        }
    }

    /// Pause before send number `sent + 1`, or `None` to give up.
    ///
    /// `sent` is how many sends have failed so far and `paused` the time
    /// already spent waiting between them.
    pub fn next_pause(
        &self,
        sent: u32,
        failure: &NotifyError,
        paused: Duration,
    ) -> Option<Duration> {
        if sent >= self.max_sends || !failure.is_transient() {
            return None;
        }
        let remaining = self.budget.checked_sub(paused)?;

        let pause = match failure {
            NotifyError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            _ => self.jittered(sent),
        };
        (pause <= remaining).then_some(pause)
    }

    /// Uniform in `[0, base_pause * 2^(sent - 1)]`.
    fn jittered(&self, sent: u32) -> Duration {
        let doublings = sent.saturating_sub(1).min(16);
        let ceiling = self.base_pause.saturating_mul(1 << doublings);
        let ceiling_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(0..=ceiling_ms))
    }
}
