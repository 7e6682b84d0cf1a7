use std::future::Future;
use std::time::Duration;

use crate::errors::{GatherError, TimeoutError};
use crate::group::TaskGroup;
use crate::limiter::CapacityLimiter;
use crate::model::{GatherOptions, Slots};

/// Run a collection of fallible futures to completion and return their
/// outcomes in submission order.
///
/// The item count is taken from the iterator's exact size when it has
/// one; an iterator without an exact size is treated as a lazy source
/// and the result container grows as items are scheduled.
///
/// Three strategies, chosen by `batch_size`/`wait_last`:
/// - `batch_size == 0`: everything starts at once in one task group.
/// - `batch_size > 0`, `wait_last == false`: everything is spawned at
///   once, but payloads pass through a capacity limiter, so at most
///   `batch_size` run concurrently and a new one starts as soon as any
///   finishes.
/// - `batch_size > 0`, `wait_last == true`: items run in consecutive
///   waves of `batch_size`; each wave drains completely before the next
///   starts, and a failing wave stops later waves from being scheduled.
///
/// With `raises = true` the first failure (lowest submission index
/// within its group) is returned after that group drains; with
/// `raises = false` failed slots are left as `None`, which a caller
/// cannot distinguish from a task that legitimately produced nothing.
pub async fn bulk_gather<I, T, E>(
    items: I,
    opts: GatherOptions,
) -> Result<Vec<Option<T>>, GatherError<E>>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let batch_size = opts.resolve()?;
    let iter = items.into_iter();
    let total = match iter.size_hint() {
        (lo, Some(hi)) if lo == hi => Some(lo),
        _ => None,
    };

    if total == Some(0) {
        // Stay fair to the scheduler even when there is nothing to do.
        tokio::task::yield_now().await;
        return Ok(Vec::new());
    }

    let mut slots = match total {
        Some(len) => Slots::fixed(len),
        None => Slots::growable(),
    };
    tracing::debug!(
        total = total.unwrap_or(0),
        batch_size,
        wait_last = opts.wait_last,
        "gather started"
    );

    let failure = if batch_size == 0 {
        run_single_group(iter, &mut slots, None).await
    } else if !opts.wait_last {
        let limiter = CapacityLimiter::new(batch_size);
        run_single_group(iter, &mut slots, Some(&limiter)).await
    } else {
        run_waves(iter, &mut slots, batch_size).await
    };

    match failure {
        Some(err) if opts.raises => Err(err),
        _ => Ok(slots.into_vec()),
    }
}

/// Strategies 1 and 2: everything goes into one task group, optionally
/// gated by the limiter.
async fn run_single_group<I, T, E>(
    iter: I,
    slots: &mut Slots<T>,
    limiter: Option<&CapacityLimiter>,
) -> Option<GatherError<E>>
where
    I: Iterator,
    I::Item: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut group = TaskGroup::new();
    for (index, fut) in iter.enumerate() {
        slots.note_scheduled(index);
        group.spawn(index, fut, limiter);
    }
    group.join_into(slots).await
}

/// Strategy 3: buffer one wave of items, dispatch it as a full task
/// group, drain it, then pull the next wave. Works the same for known
/// and lazy sources; the remainder at source exhaustion goes out as a
/// final partial wave.
async fn run_waves<I, T, E>(
    iter: I,
    slots: &mut Slots<T>,
    batch_size: usize,
) -> Option<GatherError<E>>
where
    I: Iterator,
    I::Item: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut wave = Vec::with_capacity(batch_size);
    for (index, fut) in iter.enumerate() {
        slots.note_scheduled(index);
        wave.push((index, fut));
        if wave.len() == batch_size {
            if let Some(err) = dispatch_wave(&mut wave, slots).await {
                return Some(err);
            }
        }
    }
    if !wave.is_empty() {
        if let Some(err) = dispatch_wave(&mut wave, slots).await {
            return Some(err);
        }
    }
    None
}

async fn dispatch_wave<F, T, E>(
    wave: &mut Vec<(usize, F)>,
    slots: &mut Slots<T>,
) -> Option<GatherError<E>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut group = TaskGroup::new();
    for (index, fut) in wave.drain(..) {
        group.spawn(index, fut, None);
    }
    group.join_into(slots).await
}

/// Fail-fast convenience over [`bulk_gather`]: unlimited (or
/// `limit`-capped) concurrency, first failure returned, successes in
/// submission order.
pub async fn gather<I, T, E>(items: I, limit: Option<usize>) -> Result<Vec<T>, GatherError<E>>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let opts = GatherOptions {
        limit,
        ..Default::default()
    };
    let slots = bulk_gather(items, opts).await?;
    Ok(slots
        .into_iter()
        .map(|slot| slot.expect("every slot is filled when no failure was returned"))
        .collect())
}

/// Run one future under a wall-clock deadline.
///
/// On expiry the future is dropped and a [`TimeoutError`] is returned;
/// the timeout is local to this call and is never suppressed by a
/// gather policy.
pub async fn wait_for<F>(fut: F, timeout: Duration) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| TimeoutError { elapsed: timeout })
}
