//! Dispatcher implementation using a buffered stream and governor.

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use kahani_config::DispatchConfig;
use kahani_error::{DispatchError, DispatchErrorKind};
use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Result of one work item, tagged with its submission index.
#[derive(Debug)]
pub struct DispatchOutcome<R> {
    /// Position of the item in the submitted sequence
    pub index: usize,
    /// The unit call's value, or why there is none
    pub result: Result<R, DispatchError>,
}

impl<R> DispatchOutcome<R> {
    /// True when the unit call succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The value, discarding any error.
    pub fn ok(self) -> Option<R> {
        self.result.ok()
    }
}

/// Fan-out settings: concurrency cap, per-call timeout and request pacing.
///
/// Cloning is cheap and clones share the pacing limiter.
///
/// # Example
///
/// ```
/// use kahani_dispatch::Dispatcher;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let dispatcher = Dispatcher::new(3).with_timeout(Duration::from_secs(5));
/// let outcomes = dispatcher
///     .run(vec![1, 2, 3], |_, n| async move { Ok::<_, String>(n * 10) })
///     .await;
/// let values: Vec<_> = outcomes.into_iter().filter_map(|o| o.ok()).collect();
/// assert_eq!(values, vec![10, 20, 30]);
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    cap: usize,
    timeout: Option<Duration>,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cap", &self.cap)
            .field("timeout", &self.timeout)
            .field("paced", &self.limiter.is_some())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Dispatcher {
    /// Dispatcher with at most `cap` calls in flight (at least one).
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            timeout: None,
            limiter: None,
        }
    }

    /// Dispatcher built from the `[dispatch]` configuration section.
    pub fn from_config(config: &DispatchConfig) -> Self {
        let dispatcher = Self::new(config.max_concurrency);
        let dispatcher = match config.timeout_secs {
            0 => dispatcher,
            secs => dispatcher.with_timeout(Duration::from_secs(secs)),
        };
        match config.requests_per_minute {
            Some(rpm) => dispatcher.with_requests_per_minute(rpm),
            None => dispatcher,
        }
    }

    /// Fail any single call that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start at most `rpm` calls per minute. Zero disables pacing.
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.limiter = NonZeroU32::new(rpm).map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        self
    }

    /// Concurrency cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Per-call timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Apply `f` to every item and return outcomes in submission order.
    ///
    /// `f` receives the item's index and the item. At most
    /// `min(cap, items.len())` calls run at once; completion order never
    /// affects the order of the returned outcomes.
    #[instrument(skip_all, fields(items = items.len(), cap = self.cap))]
    pub async fn run<T, R, E, F, Fut>(&self, items: Vec<T>, f: F) -> Vec<DispatchOutcome<R>>
    where
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        let width = self.cap.min(items.len()).max(1);
        let f = &f;

        let mut outcomes: Vec<DispatchOutcome<R>> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| async move {
                if let Some(limiter) = &self.limiter {
                    limiter.until_ready().await;
                }
                debug!(index, "Dispatching item");
                let result = self.call(index, f(index, item)).await;
                if let Err(e) = &result {
                    warn!(index, error = %e, "Work item failed");
                }
                DispatchOutcome { index, result }
            })
            .buffer_unordered(width)
            .collect()
            .await;

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }

    async fn call<R, E, Fut>(&self, index: usize, fut: Fut) -> Result<R, DispatchError>
    where
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        let guarded = AssertUnwindSafe(fut).catch_unwind();
        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(caught) => caught,
                Err(_) => {
                    let millis = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    return Err(DispatchError::new(index, DispatchErrorKind::Timeout(millis)));
                }
            },
            None => guarded.await,
        };

        match caught {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DispatchError::new(index, DispatchErrorKind::Unit(e.to_string()))),
            Err(payload) => Err(DispatchError::new(
                index,
                DispatchErrorKind::Panicked(panic_message(payload.as_ref())),
            )),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Apply `f` to every item with at most `cap` calls in flight.
///
/// Shorthand for [`Dispatcher::new`]`(cap).run(items, f)`: no timeout and
/// no pacing.
pub async fn parallel_map<T, R, E, F, Fut>(items: Vec<T>, cap: usize, f: F) -> Vec<DispatchOutcome<R>>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    Dispatcher::new(cap).run(items, f).await
}
