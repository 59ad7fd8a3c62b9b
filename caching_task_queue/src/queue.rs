use core::{num::NonZeroUsize, panic::AssertUnwindSafe};
use std::{collections::HashMap, sync::Arc};

use anyhow::{Error as AnyhowError, Result};
use derivative::Derivative;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt as _,
};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    config::QueueConfig,
    error::Error,
    metrics::{RequestOutcome, TaskQueueMetrics},
    task::CacheableTask,
};

type Key<T> = <T as CacheableTask>::Key;
type Value<T> = <T as CacheableTask>::Value;
type Outcome<T> = Result<Value<T>, Failure<<T as CacheableTask>::Error>>;
type PendingComputation<T> = Shared<BoxFuture<'static, Outcome<T>>>;

#[derive(Clone)]
enum Failure<E> {
    Task(E),
    Queue(Error),
}

impl<E: core::error::Error + Send + Sync + 'static> Failure<E> {
    fn into_anyhow(self) -> AnyhowError {
        match self {
            Self::Task(error) => AnyhowError::new(error),
            Self::Queue(error) => AnyhowError::new(error),
        }
    }
}

enum Lookup<T: CacheableTask> {
    Cached(Value<T>),
    Pending(PendingComputation<T>),
}

struct Bookkeeping<T: CacheableTask> {
    cache: LruCache<Key<T>, Value<T>>,
    in_flight: HashMap<Key<T>, PendingComputation<T>>,
}

struct Inner<T: CacheableTask> {
    bookkeeping: Mutex<Bookkeeping<T>>,
    max_ancestor_walk: Option<NonZeroUsize>,
    metrics: Option<Arc<TaskQueueMetrics>>,
}

/// Deduplicating cache of task results.
///
/// Cloning the queue produces another handle to the same cache.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct CachingTaskQueue<T: CacheableTask> {
    inner: Arc<Inner<T>>,
}

impl<T: CacheableTask> CachingTaskQueue<T> {
    #[must_use]
    pub fn new(config: QueueConfig, metrics: Option<Arc<TaskQueueMetrics>>) -> Self {
        let QueueConfig {
            max_cache_size,
            max_ancestor_walk,
        } = config;

        let bookkeeping = Bookkeeping {
            cache: LruCache::new(max_cache_size),
            in_flight: HashMap::new(),
        };

        Self {
            inner: Arc::new(Inner {
                bookkeeping: Mutex::new(bookkeeping),
                max_ancestor_walk,
                metrics,
            }),
        }
    }

    /// Returns the value for `task.key()`, computing it only if it is neither cached nor in flight.
    ///
    /// A launched computation runs to completion even if every caller waiting on it is dropped.
    /// Failures are reported to every caller waiting on the computation and are not cached.
    #[instrument(skip_all, fields(key = ?task.key()))]
    pub async fn perform(&self, task: T) -> Result<Value<T>> {
        match self.cached_or_pending(task) {
            Lookup::Cached(value) => Ok(value),
            Lookup::Pending(pending) => pending.await.map_err(Failure::into_anyhow),
        }
    }

    pub fn get_if_available(&self, key: Key<T>) -> Option<Value<T>> {
        self.inner.bookkeeping.lock().cache.get(&key).cloned()
    }

    /// Stores a value obtained outside the queue.
    ///
    /// Computations already in flight for `key` are unaffected and overwrite the value when they
    /// complete.
    pub fn cache(&self, key: Key<T>, value: Value<T>) {
        let mut bookkeeping = self.inner.bookkeeping.lock();
        bookkeeping.cache.put(key, value);
        self.inner.update_sizes(&bookkeeping);
    }

    pub fn remove(&self, key: Key<T>) -> Option<Value<T>> {
        let mut bookkeeping = self.inner.bookkeeping.lock();
        let removed = bookkeeping.cache.pop(&key);
        self.inner.update_sizes(&bookkeeping);
        removed
    }

    /// Removes every cached value whose key matches `predicate`.
    pub fn prune(&self, predicate: impl Fn(&Key<T>) -> bool) {
        let mut bookkeeping = self.inner.bookkeeping.lock();

        let doomed = bookkeeping
            .cache
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| predicate(key))
            .collect::<Vec<_>>();

        for key in &doomed {
            bookkeeping.cache.pop(key);
        }

        debug!("pruned {} cached values", doomed.len());

        self.inner.update_sizes(&bookkeeping);
    }

    pub fn clear(&self) {
        let mut bookkeeping = self.inner.bookkeeping.lock();
        bookkeeping.cache.clear();
        self.inner.update_sizes(&bookkeeping);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.bookkeeping.lock().cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.inner.bookkeeping.lock().in_flight.len()
    }

    #[must_use]
    pub fn metrics(&self) -> Option<&Arc<TaskQueueMetrics>> {
        self.inner.metrics.as_ref()
    }

    fn cached_or_pending(&self, task: T) -> Lookup<T> {
        let key = task.key();
        let mut bookkeeping = self.inner.bookkeeping.lock();

        if let Some(value) = bookkeeping.cache.get(&key) {
            self.inner.record_request(RequestOutcome::Cached);
            return Lookup::Cached(value.clone());
        }

        if let Some(pending) = bookkeeping.in_flight.get(&key) {
            self.inner.record_request(RequestOutcome::Duplicate);
            return Lookup::Pending(pending.clone());
        }

        let task = match self.inner.nearest_cached_ancestor(&mut bookkeeping.cache, &task) {
            Some((ancestor, base)) => {
                debug!("rebasing task for {key:?} onto cached value for {ancestor:?}");
                self.inner.record_request(RequestOutcome::Rebased);
                task.rebase(base)
            }
            None => {
                self.inner.record_request(RequestOutcome::New);
                task
            }
        };

        // The lock is still held, so the computation cannot complete before it is registered.
        let pending = self.launch(key, task);

        bookkeeping.in_flight.insert(key, pending.clone());
        self.inner.update_sizes(&bookkeeping);

        Lookup::Pending(pending)
    }

    fn launch(&self, key: Key<T>, task: T) -> PendingComputation<T> {
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(task.perform()).catch_unwind().await {
                Ok(result) => result.map_err(Failure::Task),
                Err(_) => {
                    warn!("computation for {key:?} panicked");

                    Err(Failure::Queue(Error::ComputationPanicked {
                        key: format!("{key:?}"),
                    }))
                }
            };

            inner.complete(key, &outcome);

            outcome
        });

        let inner = Arc::clone(&self.inner);

        async move {
            handle.await.unwrap_or_else(|_| {
                // The runtime dropped the computation before it could clean up after itself.
                let outcome = Err(Failure::Queue(Error::ComputationCancelled {
                    key: format!("{key:?}"),
                }));

                inner.complete(key, &outcome);

                outcome
            })
        }
        .boxed()
        .shared()
    }
}

impl<T: CacheableTask> Inner<T> {
    fn nearest_cached_ancestor(
        &self,
        cache: &mut LruCache<Key<T>, Value<T>>,
        task: &T,
    ) -> Option<(Key<T>, Value<T>)> {
        if cache.is_empty() {
            return None;
        }

        let max_steps = self.max_ancestor_walk.map_or(usize::MAX, NonZeroUsize::get);

        task.backward_steps()
            .take(max_steps)
            .find_map(|ancestor| cache.get(&ancestor).map(|base| (ancestor, base.clone())))
    }

    fn complete(&self, key: Key<T>, outcome: &Outcome<T>) {
        let mut bookkeeping = self.bookkeeping.lock();

        match outcome {
            Ok(value) => {
                debug!("caching computed value for {key:?}");
                bookkeeping.cache.put(key, value.clone());
            }
            Err(_) => {
                debug!("computation for {key:?} failed");

                if let Some(metrics) = self.metrics.as_ref() {
                    metrics.record_failure();
                }
            }
        }

        bookkeeping.in_flight.remove(&key);

        self.update_sizes(&bookkeeping);
    }

    fn record_request(&self, outcome: RequestOutcome) {
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.record_request(outcome);
        }
    }

    fn update_sizes(&self, bookkeeping: &Bookkeeping<T>) {
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.set_sizes(bookkeeping.cache.len(), bookkeeping.in_flight.len());
        }
    }
}
