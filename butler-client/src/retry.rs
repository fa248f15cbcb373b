//! Retry engine for polling operations
//!
//! [`retry_until_done`] keeps calling a probe until it reports
//! [`Attempt::Done`], returns an error, or the context ends.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::Result;

/// Outcome of one successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The awaited state has not been reached yet
    Pending,
    Done(T),
}

/// Run `probe` until it is done, fails, or `ctx` ends
///
/// The first probe runs immediately. Errors from the probe are returned as-is
/// and never retried. Between pending attempts the engine waits for
/// `retry_interval` (zero retries right away) or until `ctx` is cancelled or
/// its deadline passes, whichever comes first; the latter yields
/// [`ClientError::Cancelled`](crate::ClientError::Cancelled) or
/// [`ClientError::DeadlineExceeded`](crate::ClientError::DeadlineExceeded).
///
/// A probe that stays pending forever only stops through `ctx`, so callers
/// must pass a context with a deadline or a cancel handle.
pub async fn retry_until_done<T, F, Fut>(
    ctx: &Context,
    retry_interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let mut attempt: u32 = 1;
    loop {
        trace!(attempt, "probing");
        if let Attempt::Done(value) = probe().await? {
            debug!(attempt, "probe reported done");
            return Ok(value);
        }

        if retry_interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                biased;
                err = ctx.done() => {
                    debug!(attempt, error = %err, "stopped waiting");
                    return Err(err.into());
                }
                _ = tokio::time::sleep(retry_interval) => {}
            }
        }

        if let Some(err) = ctx.err() {
            debug!(attempt, error = %err, "stopped waiting");
            return Err(err.into());
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::time::Instant;

    type ProbeFn = fn() -> Result<Attempt<()>>;

    fn done() -> Result<Attempt<()>> {
        Ok(Attempt::Done(()))
    }

    fn pending() -> Result<Attempt<()>> {
        Ok(Attempt::Pending)
    }

    fn failed() -> Result<Attempt<()>> {
        Err(ClientError::Parse("don't retry".to_string()))
    }

    /// Runs a scripted sequence of probe outcomes and reports how many ran
    async fn run_script(
        script: &[ProbeFn],
        timeout: Duration,
        retry_interval: Duration,
    ) -> (Result<()>, usize) {
        let ctx = Context::with_timeout(timeout);
        let mut calls = 0;
        let result = retry_until_done(&ctx, retry_interval, || {
            assert!(
                calls < script.len(),
                "unexpected call, expected {} calls",
                script.len()
            );
            let outcome = script[calls]();
            calls += 1;
            async move { outcome }
        })
        .await;
        (result, calls)
    }

    #[tokio::test]
    async fn test_first_done_call_does_not_retry() {
        let (result, calls) = run_script(&[done], Duration::from_secs(3600), Duration::ZERO).await;
        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_first_error_is_returned_without_retry() {
        let (result, calls) =
            run_script(&[failed], Duration::from_secs(3600), Duration::ZERO).await;
        assert!(matches!(result, Err(ClientError::Parse(ref m)) if m == "don't retry"));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_pending_then_done_returns_after_second_call() {
        let (result, calls) = run_script(
            &[pending, done],
            Duration::from_secs(3600),
            Duration::from_millis(1),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_error_on_retry_stops_immediately() {
        let (result, calls) = run_script(
            &[pending, failed],
            Duration::from_secs(3600),
            Duration::ZERO,
        )
        .await;
        assert!(matches!(result, Err(ClientError::Parse(_))));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_deadline_exceeded_does_not_retry() {
        let (result, calls) = run_script(
            &[pending],
            Duration::from_nanos(1),
            Duration::from_secs(3600),
        )
        .await;
        assert!(matches!(result, Err(ClientError::DeadlineExceeded)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_always_pending_ends_at_deadline() {
        let timeout = Duration::from_millis(30);
        let started = Instant::now();
        let ctx = Context::with_timeout(timeout);
        let mut calls = 0u32;

        let result: Result<()> = retry_until_done(&ctx, Duration::from_secs(3600), || {
            calls += 1;
            async { Ok(Attempt::Pending) }
        })
        .await;

        assert!(matches!(result, Err(ClientError::DeadlineExceeded)));
        assert_eq!(calls, 1);
        assert!(started.elapsed() < timeout + Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_zero_interval_busy_polls_until_deadline() {
        let ctx = Context::with_timeout(Duration::from_millis(10));
        let mut calls = 0u32;

        let result: Result<()> = retry_until_done(&ctx, Duration::ZERO, || {
            calls += 1;
            async { Ok(Attempt::Pending) }
        })
        .await;

        assert!(result.unwrap_err().is_deadline_exceeded());
        assert!(calls > 1);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait() {
        let (ctx, handle) = Context::with_cancel();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let started = Instant::now();
        let result: Result<()> = retry_until_done(&ctx, Duration::from_secs(3600), || async {
            Ok(Attempt::Pending)
        })
        .await;

        assert!(result.unwrap_err().is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_done_value_is_returned() {
        let ctx = Context::with_timeout(Duration::from_secs(1));
        let mut polls = 0;
        let value = retry_until_done(&ctx, Duration::from_millis(1), || {
            polls += 1;
            let n = polls;
            async move {
                Ok(if n < 3 {
                    Attempt::Pending
                } else {
                    Attempt::Done(n * 10)
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 30);
    }
}
