use std::time::Duration;

use thiserror::Error;

/// Failure surfaced by `bulk_gather`/`gather`.
///
/// `Params` is returned synchronously, before any task is scheduled.
/// The other variants carry the submission index of the failing item;
/// when several siblings fail in one group, only the lowest index
/// survives the reduction.
#[derive(Debug, Error)]
pub enum GatherError<E> {
    #[error("`limit` ({limit}) conflicts with `batch_size` ({batch_size})")]
    Params { batch_size: usize, limit: usize },

    #[error("task {index} failed")]
    Task {
        index: usize,
        #[source]
        source: E,
    },

    #[error("task {index} panicked: {message}")]
    Panicked { index: usize, message: String },

    #[error("task {index} was cancelled by the runtime")]
    Cancelled { index: usize },
}

impl<E> GatherError<E> {
    /// Submission index of the failing item, if this failure has one.
    pub fn index(&self) -> Option<usize> {
        match self {
            GatherError::Params { .. } => None,
            GatherError::Task { index, .. }
            | GatherError::Panicked { index, .. }
            | GatherError::Cancelled { index } => Some(*index),
        }
    }

    /// The underlying item error, if this is a plain task failure.
    pub fn into_source(self) -> Option<E> {
        match self {
            GatherError::Task { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Deadline elapsed inside `wait_for`.
///
/// Deliberately a separate type: a timeout is never swallowed by a
/// `raises = false` gather policy elsewhere.
#[derive(Debug, Error)]
#[error("deadline elapsed after {elapsed:?}")]
pub struct TimeoutError {
    pub elapsed: Duration,
}
