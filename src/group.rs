use std::future::Future;

use tokio::task::{JoinError, JoinHandle};

use crate::errors::GatherError;
use crate::limiter::CapacityLimiter;
use crate::model::Slots;

/// Runs one group of indexed tasks concurrently and drains them all
/// before reporting.
///
/// Handles are awaited in submission order, so the group never returns
/// while a sibling is still running and the surviving failure is always
/// the one with the lowest submission index, regardless of completion
/// order.
pub(crate) struct TaskGroup<T, E> {
    handles: Vec<(usize, JoinHandle<Result<T, E>>)>,
}

impl<T, E> TaskGroup<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Start one task. With a limiter, the payload waits for an
    /// admission slot inside the spawned task, so scheduling itself
    /// never blocks the caller.
    pub(crate) fn spawn<F>(&mut self, index: usize, fut: F, limiter: Option<&CapacityLimiter>)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let handle = match limiter {
            Some(limiter) => {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let _slot = limiter.acquire().await;
                    fut.await
                })
            }
            None => tokio::spawn(fut),
        };
        self.handles.push((index, handle));
    }

    /// Wait for every task in the group, writing successes into `slots`
    /// at their submission index and reducing failures to at most one.
    pub(crate) async fn join_into(self, slots: &mut Slots<T>) -> Option<GatherError<E>> {
        let mut failures = Vec::new();
        for (index, handle) in self.handles {
            match handle.await {
                Ok(Ok(value)) => slots.set(index, value),
                Ok(Err(source)) => failures.push((index, GatherError::Task { index, source })),
                Err(join_err) => failures.push((index, join_failure(index, join_err))),
            }
        }
        first_by_index(failures)
    }
}

fn join_failure<E>(index: usize, err: JoinError) -> GatherError<E> {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        GatherError::Panicked { index, message }
    } else {
        GatherError::Cancelled { index }
    }
}

/// Failure reducer for one group: the failure with the lowest
/// submission index wins, the rest are dropped.
///
/// Kept as a named function so the tie-break policy is pinned by a
/// direct test rather than by whatever order failures were collected in.
pub fn first_by_index<F>(failures: Vec<(usize, F)>) -> Option<F> {
    failures
        .into_iter()
        .min_by_key(|(index, _)| *index)
        .map(|(_, failure)| failure)
}
