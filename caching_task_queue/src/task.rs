use core::{fmt::Debug, hash::Hash};

use async_trait::async_trait;

/// A unit of work whose result is cached under [`CacheableTask::key`].
///
/// Tasks are value-like. Rebasing produces a new task instead of modifying the receiver.
#[async_trait]
pub trait CacheableTask: Sized + Send + 'static {
    type Key: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;
    type Error: core::error::Error + Clone + Send + Sync + 'static;
    type BackwardSteps: Iterator<Item = Self::Key>;

    fn key(&self) -> Self::Key;

    /// Keys of values this task could start from, nearest first.
    ///
    /// The sequence must be finite and strictly decreasing.
    /// It must start immediately below [`CacheableTask::key`] and must not consult any cache.
    fn backward_steps(&self) -> Self::BackwardSteps;

    /// Returns a task for the same key that starts from `base` instead of looking one up.
    #[must_use]
    fn rebase(&self, base: Self::Value) -> Self;

    async fn perform(self) -> Result<Self::Value, Self::Error>;
}
