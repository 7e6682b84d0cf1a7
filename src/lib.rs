//! Bounded-concurrency task execution on top of tokio
//!
//! # Features
//! - `bulk_gather`: run many futures with a concurrency cap, results in submission order
//! - Sliding-window or wave-by-wave admission strategies
//! - Fail-fast or collect-all failure policies
//! - `start_tasks`: background tasks tied to a scope, cancelled on exit
//! - `wait_for`: single-future deadline

pub mod errors;
pub mod gather;
pub mod group;
pub mod limiter;
pub mod model;
pub mod supervisor;

pub use errors::{GatherError, TimeoutError};
pub use gather::{bulk_gather, gather, wait_for};
pub use limiter::CapacityLimiter;
pub use model::GatherOptions;
pub use supervisor::{start_tasks, Startable, TaskSet};
