use std::thread;
use std::time::Duration;

use rand::Rng;

/// Exponential backoff with full jitter. Kept as a standalone utility: the
/// request path itself never retries, callers opt in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl Backoff {
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);
        if exp.is_zero() {
            return exp;
        }
        let jitter = rand::thread_rng().gen_range(0..=exp.as_millis() as u64);
        Duration::from_millis(jitter)
    }
}

/// Runs `op` until it succeeds or `max_attempts` is exhausted, sleeping a
/// jittered exponential delay between attempts. Returns the last error.
pub fn retry_with_backoff<T, E>(
    policy: Backoff,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                last_err = Some(err);
                if attempt + 1 < attempts {
                    thread::sleep(policy.delay_for(attempt));
                }
            }
        }
    }
    Err(last_err.expect("at least one attempt"))
}
