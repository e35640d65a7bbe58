//! Retry-then-degrade policy for reads the UI can live without.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(200))
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// No waiting between attempts, for tests.
    #[must_use]
    pub fn immediate(retries: u32) -> Self {
        Self::new(retries, Duration::ZERO)
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Run `op` up to `retries + 1` times, returning the last error.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(what, attempt, error = %err, "read failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Like [`RetryPolicy::run`], but falls back to `T::default()` once
    /// retries are exhausted.
    pub async fn run_or_default<T, E, F, Fut>(&self, what: &str, op: F) -> T
    where
        T: Default,
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.run(what, op).await {
            Ok(value) => value,
            Err(err) => {
                warn!(what, error = %err, "read failed, showing empty result");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::immediate(2);
        let value: Result<u32, String> = policy
            .run("test", || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err(format!("fail {n}")) } else { Ok(7) }
            })
            .await;
        assert_eq!(value, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn degrades_to_default_when_exhausted() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::immediate(2);
        let value: Vec<u8> = policy
            .run_or_default("test", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<u8>, _>("down")
            })
            .await;
        assert!(value.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
