use std::sync::Once;

use crate::errors::GatherError;

static LIMIT_DEPRECATION: Once = Once::new();

/// Configuration for one `bulk_gather` call.
#[derive(Debug, Clone)]
pub struct GatherOptions {
    /// Concurrency cap; 0 means unlimited.
    pub batch_size: usize,
    /// If true, drain each wave of `batch_size` tasks completely before
    /// starting the next one; if false, admit through a capacity limiter
    /// so a new task starts as soon as any running one finishes.
    pub wait_last: bool,
    /// If true, the first captured failure is returned once its group
    /// drains; if false, failures are suppressed and their slots stay
    /// `None`.
    pub raises: bool,
    /// Deprecated alias of `batch_size`, kept for callers of the old
    /// signature. Setting both to different values is a configuration
    /// error.
    pub limit: Option<usize>,
}

impl Default for GatherOptions {
    fn default() -> Self {
        Self {
            batch_size: 0,
            wait_last: false,
            raises: true,
            limit: None,
        }
    }
}

impl GatherOptions {
    pub fn batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Default::default()
        }
    }

    pub fn wait_last(mut self, wait_last: bool) -> Self {
        self.wait_last = wait_last;
        self
    }

    pub fn raises(mut self, raises: bool) -> Self {
        self.raises = raises;
        self
    }

    /// Merge the deprecated `limit` alias into `batch_size`.
    ///
    /// Runs once at the engine boundary so the scheduling code only ever
    /// sees a single cap value.
    pub(crate) fn resolve<E>(&self) -> Result<usize, GatherError<E>> {
        match self.limit {
            None => Ok(self.batch_size),
            Some(limit) if self.batch_size == 0 => Ok(limit),
            Some(limit) if limit != self.batch_size => Err(GatherError::Params {
                batch_size: self.batch_size,
                limit,
            }),
            Some(_) => {
                LIMIT_DEPRECATION.call_once(|| {
                    tracing::warn!("`limit` is deprecated, use `batch_size` only");
                });
                Ok(self.batch_size)
            }
        }
    }
}

/// Ordered result container, chosen once at engine entry.
///
/// `Fixed` is pre-allocated when the item count is known upfront;
/// growing it would be a scheduling bug. `Growable` backs lazy sources
/// and appends one placeholder per item as it is scheduled, so its
/// length always equals the number of items scheduled so far.
#[derive(Debug)]
pub(crate) enum Slots<T> {
    Fixed(Vec<Option<T>>),
    Growable(Vec<Option<T>>),
}

impl<T> Slots<T> {
    pub(crate) fn fixed(len: usize) -> Self {
        let mut v = Vec::with_capacity(len);
        v.resize_with(len, || None);
        Slots::Fixed(v)
    }

    pub(crate) fn growable() -> Self {
        Slots::Growable(Vec::new())
    }

    /// Record that the item at `index` has been scheduled.
    pub(crate) fn note_scheduled(&mut self, index: usize) {
        match self {
            Slots::Fixed(v) => {
                assert!(index < v.len(), "scheduled past a fixed-size container");
            }
            Slots::Growable(v) => {
                assert_eq!(index, v.len(), "growable container out of step");
                v.push(None);
            }
        }
    }

    pub(crate) fn set(&mut self, index: usize, value: T) {
        match self {
            Slots::Fixed(v) | Slots::Growable(v) => v[index] = Some(value),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<Option<T>> {
        match self {
            Slots::Fixed(v) | Slots::Growable(v) => v,
        }
    }
}
