//! Exponential reconnect backoff.

use std::time::Duration;

use synctime_core::config::realtime::RealtimeConfig;

/// Exponential backoff with an upper bound.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    current: Duration,
    attempt: u32,
}

impl Backoff {
    /// Creates a backoff policy.
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            multiplier: multiplier.max(1.0),
            current: initial,
            attempt: 0,
        }
    }

    /// Creates the policy described by the realtime configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(
            Duration::from_millis(config.reconnect_initial_ms),
            Duration::from_millis(config.reconnect_max_ms),
            config.reconnect_multiplier,
        )
    }

    /// Delay before the next attempt; grows the following delay.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.attempt = self.attempt.saturating_add(1);
        self.current = self.current.mul_f64(self.multiplier).min(self.max);
        delay
    }

    /// Attempts made since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Back to the initial delay, after a successful handshake.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempt = 0;
    }
}
