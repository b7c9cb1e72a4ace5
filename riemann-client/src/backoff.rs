//! Randomized exponential backoff.
//!
//! After the n-th consecutive failure the next attempt is deferred by a
//! uniformly random number of whole seconds in `0..=2^n`. The deadline is only
//! checked when the client is next used; nothing is scheduled.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest exponent used for the delay bound (2^10 s, about 17 minutes).
pub const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }
}

/// Retry state: consecutive failures and the earliest next attempt.
pub struct Backoff<K = SystemClock> {
    attempts: u32,
    retry_after: Option<Instant>,
    clock: K,
    rng: StdRng,
}

impl<K: Clock> Backoff<K> {
    pub fn new(clock: K) -> Self {
        Self::with_rng(clock, StdRng::from_entropy())
    }

    /// Uses a seeded generator, for reproducible delays.
    pub fn with_seed(clock: K, seed: u64) -> Self {
        Self::with_rng(clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(clock: K, rng: StdRng) -> Self {
        Self {
            attempts: 0,
            retry_after: None,
            clock,
            rng,
        }
    }

    /// Consecutive failures since the last success.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Earliest instant at which another attempt is allowed.
    pub fn retry_after(&self) -> Option<Instant> {
        self.retry_after
    }

    /// Returns whether attempts are currently suppressed.
    pub fn is_throttled(&self) -> bool {
        match self.retry_after {
            Some(deadline) => self.clock.now() < deadline,
            None => false,
        }
    }

    /// Time left until the deadline, if throttled.
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.retry_after?;
        let now = self.clock.now();
        (now < deadline).then(|| deadline - now)
    }

    /// Records a failed attempt and schedules the next one. Returns the delay.
    pub fn record_failure(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        let exponent = self.attempts.min(MAX_BACKOFF_EXPONENT);
        let delay = Duration::from_secs(self.rng.gen_range(0..=1u64 << exponent));
        self.retry_after = Some(self.clock.now() + delay);
        delay
    }

    /// Clears the failure count and the deadline.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.retry_after = None;
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

impl Default for Backoff<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}
