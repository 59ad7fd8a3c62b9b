//! A cache of asynchronously computed values that deduplicates concurrent requests.
//!
//! Requests are expressed as [`CacheableTask`]s. A task that misses the cache may still reuse a
//! cached value as its starting point: [`CachingTaskQueue`] walks [`CacheableTask::backward_steps`]
//! and [rebases](CacheableTask::rebase) the task onto the nearest cached ancestor before launching
//! it.

pub use crate::{
    config::QueueConfig,
    error::Error,
    metrics::{RequestOutcome, TaskQueueMetrics},
    queue::CachingTaskQueue,
    task::CacheableTask,
};

mod config;
mod error;
mod metrics;
mod queue;
mod task;
