use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One background task to be supervised: either an already-constructed
/// pending computation or a factory producing one.
///
/// Resolved into a plain future once, at the boundary; nothing deeper
/// in the supervisor dispatches on the variant.
pub enum Startable {
    Prepared(BoxFuture<'static, ()>),
    Factory(Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>),
}

impl Startable {
    pub fn prepared<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Startable::Prepared(fut.boxed())
    }

    pub fn factory<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Startable::Factory(Box::new(move || f().boxed()))
    }

    fn into_future(self) -> BoxFuture<'static, ()> {
        match self {
            Startable::Prepared(fut) => fut,
            Startable::Factory(f) => f(),
        }
    }
}

/// A set of supervised background tasks sharing one cancellation token.
///
/// Startup is synchronous (no suspension point between spawns), so an
/// external cancellation cannot observe a half-started set. Exit is
/// all-or-nothing: cancelling the token tears the whole set down as one
/// unit, and dropping the set mid-flight aborts whatever is still
/// running. No task outlives the set.
pub struct TaskSet {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl TaskSet {
    pub fn start<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = Startable>,
    {
        let token = CancellationToken::new();
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let fut = task.into_future();
                let token = token.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = fut => {}
                    }
                })
            })
            .collect();
        tracing::debug!(count = handles.len(), "background tasks started");
        Self { token, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Request cancellation without waiting for the tasks to wind down.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel every supervised task and wait until all of them have
    /// terminated.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        tracing::debug!("background tasks terminated");
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        self.token.cancel();
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Run `body` with `first` and `rest` running in the background; on
/// exit, normal or not, every task is cancelled.
///
/// Takes at least one task, so an accidentally-empty set cannot slip
/// through; supervising zero tasks is only reachable through [`TaskSet`]
/// directly. The supervised tasks are expected to run until cancelled;
/// their results are discarded. If `body`'s future is dropped before
/// completion the set is torn down through `TaskSet`'s drop guard, so
/// cancellation is unconditional either way.
pub async fn start_tasks<I, B>(first: Startable, rest: I, body: B) -> B::Output
where
    I: IntoIterator<Item = Startable>,
    B: Future,
{
    let set = TaskSet::start(std::iter::once(first).chain(rest));
    let out = body.await;
    set.shutdown().await;
    out
}
