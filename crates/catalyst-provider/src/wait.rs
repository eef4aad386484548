//! Fixed-interval poller
//!
//! The condition is checked once immediately, then once per interval until
//! it reports done, fails, or the context ends. Condition errors end the wait
//! at once; any retry policy belongs to the condition or the client.

use crate::context::Context;
use crate::error::ContextError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Interval between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum WaitError<E> {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Condition(E),
}

/// Poll `condition` until it returns `Ok(true)`.
pub async fn wait_until<F, Fut, E>(
    ctx: &Context,
    interval: Duration,
    mut condition: F,
) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut checks: u32 = 0;
    loop {
        checks += 1;
        let done = ctx.run(condition()).await?.map_err(WaitError::Condition)?;
        if done {
            tracing::debug!("Condition met after {} check(s)", checks);
            return Ok(());
        }

        ctx.run(tokio::time::sleep(interval)).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_check_is_immediate() {
        let ctx = Context::background();
        let start = Instant::now();

        wait_until(&ctx, DEFAULT_POLL_INTERVAL, || async { Ok::<_, Boom>(true) })
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_within_one_interval_of_done() {
        let ctx = Context::background();
        let calls = counter();
        let start = Instant::now();

        let seen = calls.clone();
        wait_until(&ctx, DEFAULT_POLL_INTERVAL, move || {
            let seen = seen.clone();
            async move { Ok::<_, Boom>(seen.fetch_add(1, Ordering::SeqCst) + 1 >= 3) }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), DEFAULT_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_before_done() {
        let ctx = Context::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let err = wait_until(&ctx, DEFAULT_POLL_INTERVAL, || async { Ok::<_, Boom>(false) })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Context(ContextError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_before_done() {
        let ctx = Context::background().with_timeout(Duration::from_secs(7));

        let err = wait_until(&ctx, DEFAULT_POLL_INTERVAL, || async { Ok::<_, Boom>(false) })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitError::Context(ContextError::DeadlineExceeded)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_condition_error_is_not_retried() {
        let ctx = Context::background();
        let calls = counter();

        let seen = calls.clone();
        let err = wait_until(&ctx, DEFAULT_POLL_INTERVAL, move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Err::<bool, _>(Boom)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::Condition(Boom)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_context_skips_condition() {
        let ctx = Context::background();
        ctx.cancel();
        let calls = counter();

        let seen = calls.clone();
        let result = wait_until(&ctx, DEFAULT_POLL_INTERVAL, move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Boom>(true)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
