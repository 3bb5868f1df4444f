//! Cancellation and deadline scope for a single facade call.

use std::future::Future;
use std::time::Duration;

use paramstore_storage::{StorageError, StorageResult};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Bounds every remote call made on behalf of one operation.
///
/// The deadline covers the whole operation; the call timeout restarts for
/// each remote call. Cloning shares the cancellation token, so cancelling any
/// clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    call_timeout: Option<Duration>,
}

impl CallContext {
    /// A context that never cancels and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled together with `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..Default::default()
        }
    }

    /// Sets a deadline `timeout` from now, keeping an earlier one if present.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Limits each remote call to `timeout`, measured from the start of that
    /// call. An expired call fails on its own and later calls still run.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fails if the context is already cancelled or past its deadline.
    pub fn check(&self) -> StorageResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(StorageError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Runs one remote call, aborting it on cancellation, deadline or call
    /// timeout.
    pub async fn run<F, T>(&self, call: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        self.check()?;
        let call_deadline = self.call_timeout.map(|t| Instant::now() + t);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StorageError::Cancelled),
            _ = sleep_until(self.deadline) => Err(StorageError::DeadlineExceeded),
            _ = sleep_until(call_deadline) => Err(StorageError::Timeout {
                timeout_ms: self.call_timeout.map_or(0, |t| t.as_millis() as u64),
            }),
            result = call => result,
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_default_context_runs_call() {
        let ctx = CallContext::new();
        let result = ctx.run(async { Ok::<_, StorageError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_call() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone());
        token.cancel();

        let polled = AtomicBool::new(false);
        let result = ctx
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, StorageError>(())
            })
            .await;
        assert_eq!(result, Err(StorageError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_call() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, StorageError>(())
            })
            .await;
        assert_eq!(result, Err(StorageError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_restarts_for_each_call() {
        let ctx = CallContext::new().with_call_timeout(Duration::from_secs(2));
        let slow = || async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, StorageError>(())
        };

        // five calls take 5s in total, each stays under its own 2s limit
        for _ in 0..5 {
            assert_eq!(ctx.run(slow()).await, Ok(()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_is_not_an_interruption() {
        let ctx = CallContext::new().with_call_timeout(Duration::from_millis(300));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, StorageError>(())
            })
            .await;

        assert_eq!(result, Err(StorageError::Timeout { timeout_ms: 300 }));
        assert!(!result.unwrap_err().is_interrupted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_call_timeout() {
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_call_timeout(Duration::from_secs(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StorageError>(())
            })
            .await;
        assert_eq!(result, Err(StorageError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_in_flight_call() {
        let ctx = CallContext::new();
        let token = ctx.cancellation_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = ctx.run(std::future::pending::<StorageResult<()>>()).await;
        assert_eq!(result, Err(StorageError::Cancelled));
    }

    #[tokio::test]
    async fn test_with_timeout_keeps_earliest_deadline() {
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        let deadline = ctx.deadline().unwrap();
        assert!(deadline <= Instant::now() + Duration::from_secs(1));
    }
}
