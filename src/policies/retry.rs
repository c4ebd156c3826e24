//! # Bounded retry with backoff.
//!
//! [`RetryPolicy`] bounds how many times a vehicle tries to enter before it
//! gives up, and [`retry_with_backoff`] drives the attempts:
//!
//! ```text
//! loop {
//!   ├─► wait until running (paused time consumes no attempts)
//!   │     └─ shutdown requested ─► Cancelled
//!   ├─► attempts += 1
//!   ├─► attempt(attempts)
//!   │     ├─ Ok(v)  ─► Accepted { v, attempts }
//!   │     └─ Err(e) ─► attempts == max_retries + 1 ─► RejectedPermanently
//!   │                  otherwise: on_refused(e, Some(delay)), sleep(delay)
//! }
//! ```
//!
//! The backoff sleep is not interrupted by pause or shutdown; both are observed
//! at the start of the next iteration.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::RunFlag;
use crate::policies::BackoffPolicy;

/// How many times a refused vehicle may retry, and how long it waits in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (`0` = a single attempt).
    pub max_retries: u32,
    /// Delay between consecutive attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// 30 retries, constant 100ms apart.
    fn default() -> Self {
        Self {
            max_retries: 30,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Total attempts allowed: `max_retries + 1`.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Terminal result of [`retry_with_backoff`].
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// An attempt succeeded.
    Accepted {
        /// Value produced by the successful attempt.
        value: T,
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// Every allowed attempt was refused.
    RejectedPermanently {
        /// Attempts made.
        attempts: u32,
    },
    /// Shutdown was requested before an attempt could succeed.
    Cancelled {
        /// Attempts made before cancellation.
        attempts: u32,
    },
}

impl<T> RetryOutcome<T> {
    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Accepted { attempts, .. }
            | RetryOutcome::RejectedPermanently { attempts }
            | RetryOutcome::Cancelled { attempts } => *attempts,
        }
    }

    /// True for [`RetryOutcome::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, RetryOutcome::Accepted { .. })
    }
}

/// Runs `attempt` until it succeeds, the policy is exhausted, or `token` is cancelled.
///
/// `attempt` receives the 1-based attempt number. `on_refused` is called for
/// every refusal with the attempt number and the scheduled delay (`None` for the
/// final refusal, which ends the loop).
pub async fn retry_with_backoff<T, E, A, R>(
    policy: &RetryPolicy,
    run: &RunFlag,
    token: &CancellationToken,
    mut attempt: A,
    mut on_refused: R,
) -> RetryOutcome<T>
where
    A: FnMut(u32) -> Result<T, E>,
    R: FnMut(&E, u32, Option<Duration>),
{
    let max = policy.max_attempts();
    let mut attempts: u32 = 0;

    loop {
        if !run.wait_running(token).await {
            return RetryOutcome::Cancelled { attempts };
        }

        attempts += 1;
        match attempt(attempts) {
            Ok(value) => return RetryOutcome::Accepted { value, attempts },
            Err(e) => {
                if attempts >= max {
                    on_refused(&e, attempts, None);
                    return RetryOutcome::RejectedPermanently { attempts };
                }
                let delay = policy.backoff.next(attempts - 1);
                on_refused(&e, attempts, Some(delay));
                time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff: BackoffPolicy::constant(Duration::from_millis(100)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn accepts_on_third_attempt() {
        let run = RunFlag::new(true);
        let token = CancellationToken::new();
        let mut delays = Vec::new();

        let out = retry_with_backoff(
            &policy(5),
            &run,
            &token,
            |n| if n == 3 { Ok(n * 10) } else { Err("full") },
            |_, _, d| delays.push(d),
        )
        .await;

        match out {
            RetryOutcome::Accepted { value, attempts } => {
                assert_eq!(value, 30);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(delays, vec![Some(Duration::from_millis(100)); 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries_plus_one() {
        let run = RunFlag::new(true);
        let token = CancellationToken::new();
        let mut last = None;

        let out = retry_with_backoff(
            &policy(3),
            &run,
            &token,
            |_| Err::<(), _>("gate closed"),
            |_, n, d| last = Some((n, d)),
        )
        .await;

        assert!(matches!(out, RetryOutcome::RejectedPermanently { attempts: 4 }));
        assert_eq!(last, Some((4, None)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let run = RunFlag::new(true);
        let token = CancellationToken::new();
        let out = retry_with_backoff(&policy(0), &run, &token, |_| Err::<(), _>(()), |_, _, _| {})
            .await;
        assert_eq!(out.attempts(), 1);
        assert!(!out.is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_time_consumes_no_attempts() {
        let run = RunFlag::new(false);
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let handle = {
            let run = run.clone();
            let token = token.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                retry_with_backoff(
                    &policy(1),
                    &run,
                    &token,
                    |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ()>(())
                    },
                    |_, _, _| {},
                )
                .await
                .attempts()
            })
        };

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        run.start();
        assert_eq!(handle.await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_observed_at_loop_boundary() {
        let run = RunFlag::new(true);
        let token = CancellationToken::new();

        let out = retry_with_backoff(
            &policy(10),
            &run,
            &token,
            |n| {
                if n == 2 {
                    token.cancel();
                }
                Err::<(), _>(())
            },
            |_, _, _| {},
        )
        .await;

        assert!(matches!(out, RetryOutcome::Cancelled { attempts: 2 }));
    }
}
