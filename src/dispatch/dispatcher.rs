//! Batch fan-out with a single join barrier.
//!
//! Every item of a batch becomes one spawned unit. Units publish their
//! output into one aggregation channel, exactly once each, and the caller
//! only suspends while draining that channel. A unit that panics or that is
//! still pending when the batch deadline fires is reported as a
//! [`UnitFailure`] instead of being dropped, so the join always yields one
//! [`Completion`] per input item.
//!
//! Units are owned by the join. Dropping the `dispatch` future, for example
//! when an outer request timeout fires, aborts every unit still running.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Wall-clock budget for the whole batch. Units still pending when it
    /// expires are aborted and reported as [`UnitFailure::TimedOut`].
    pub deadline: Option<Duration>,
    /// Upper bound on units running at the same time. `None` runs the
    /// whole batch at once.
    pub max_concurrency: Option<usize>,
}

impl DispatchOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitFailure {
    TimedOut,
    Panicked(String),
}

impl std::fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitFailure::TimedOut => write!(f, "timeout"),
            UnitFailure::Panicked(message) => write!(f, "unit panicked: {}", message),
        }
    }
}

/// Output of one unit, tagged with the position of its item in the batch.
#[derive(Debug)]
pub struct Completion<O> {
    pub index: usize,
    pub result: Result<O, UnitFailure>,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    /// The aggregation channel closed before every unit reported.
    /// Units always report, so this means the runtime is shutting down.
    #[error("Dispatcher received {received} completions for a batch of {expected}")]
    MissingCompletions { expected: usize, received: usize },
}

/// Run `work` over every item concurrently and wait for all of them.
///
/// Returns exactly `items.len()` completions, in completion order. Callers
/// that need input order can sort on [`Completion::index`].
pub async fn dispatch<I, O, F, Fut>(
    items: Vec<I>,
    work: F,
    options: &DispatchOptions,
) -> Result<Vec<Completion<O>>, DispatchError>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let expected = items.len();
    if expected == 0 {
        return Ok(Vec::new());
    }

    // Capacity equals the batch size so a unit never waits on the join.
    let (sender, mut receiver) = mpsc::channel::<Completion<O>>(expected);
    let limiter = options
        .max_concurrency
        .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    let mut units = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let unit = work(item);
        let sender = sender.clone();
        let limiter = limiter.clone();
        units.spawn(async move {
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            let result = AssertUnwindSafe(unit)
                .catch_unwind()
                .await
                .map_err(|panic| UnitFailure::Panicked(panic_message(panic.as_ref())));
            // Fails only when the join already gave up on this batch.
            let _ = sender.send(Completion { index, result }).await;
        });
    }
    drop(sender);

    let deadline = options.deadline.map(|budget| Instant::now() + budget);
    let mut completions = Vec::with_capacity(expected);
    let mut reported = vec![false; expected];
    let mut timed_out = false;

    while completions.len() < expected {
        let next = match deadline {
            Some(at) => match tokio::time::timeout_at(at, receiver.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            },
            None => receiver.recv().await,
        };

        match next {
            Some(completion) => {
                if !reported[completion.index] {
                    reported[completion.index] = true;
                    completions.push(completion);
                }
            }
            None => break,
        }
    }

    if completions.len() < expected {
        if !timed_out {
            return Err(DispatchError::MissingCompletions {
                expected,
                received: completions.len(),
            });
        }

        let pending = expected - completions.len();
        tracing::warn!(
            expected,
            pending,
            "Batch deadline exceeded, aborting pending units"
        );
        units.abort_all();
        for (index, _) in reported.iter().enumerate().filter(|(_, done)| !**done) {
            completions.push(Completion {
                index,
                result: Err(UnitFailure::TimedOut),
            });
        }
    }

    Ok(completions)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
