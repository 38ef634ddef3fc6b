//! Bounded backoff for restarting capture after unsolicited termination

use std::time::Duration;

/// Limits applied to automatic capture restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Delay before the second consecutive restart
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Consecutive restarts allowed before giving up
    pub max_attempts: u32,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            max_attempts: 8,
        }
    }
}

impl RestartPolicy {
    /// Delay before restart number `attempt` (1-based)
    ///
    /// The first restart after a healthy stretch is immediate; later ones
    /// double from `initial_delay` up to `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(16);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// What to do about an unsolicited termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    Restart { attempt: u32, delay: Duration },
    GiveUp { attempts: u32 },
}

/// Counts consecutive unsolicited terminations
#[derive(Debug, Clone)]
pub struct RestartTracker {
    policy: RestartPolicy,
    consecutive: u32,
}

impl RestartTracker {
    pub fn new(policy: RestartPolicy) -> Self {
        Self {
            policy,
            consecutive: 0,
        }
    }

    pub fn next(&mut self) -> RestartDecision {
        if self.consecutive >= self.policy.max_attempts {
            return RestartDecision::GiveUp {
                attempts: self.consecutive,
            };
        }
        self.consecutive += 1;
        RestartDecision::Restart {
            attempt: self.consecutive,
            delay: self.policy.delay_for(self.consecutive),
        }
    }

    /// Capture proved healthy; start counting from zero again
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }
}
