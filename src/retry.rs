//! Bounded retry with random jitter between attempts.

use std::thread;
use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Upper bound of the random pause between attempts.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_jitter: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, for callers that only care about attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            max_jitter: Duration::ZERO,
        }
    }

    fn pause(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts. The last error is returned as-is.
pub fn retry<T, E, F, P>(policy: RetryPolicy, is_transient: P, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && is_transient(&err) => {
                let pause = policy.pause();
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    pause_ms = pause.as_millis() as u64,
                    "transient failure, retrying: {}",
                    err
                );
                if !pause.is_zero() {
                    thread::sleep(pause);
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
