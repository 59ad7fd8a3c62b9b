use std::sync::Arc;

use anyhow::Result;
use caching_task_queue::{CachingTaskQueue, QueueConfig, TaskQueueMetrics};
use derivative::Derivative;
use helper_functions::misc;
use tracing::debug;
use types::{
    nonstandard::SlotAndBlockRoot,
    phase0::{
        containers::Checkpoint,
        primitives::{Slot, H256},
    },
    preset::Preset,
    traits::BeaconState,
};

use crate::{collaborators::Collaborators, task::StateAtSlotTask};

/// Produces states advanced through empty slots, reusing cached states wherever possible.
///
/// Failures are returned as [`anyhow::Error`]s wrapping [`Error`](crate::Error) or
/// [`caching_task_queue::Error`].
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct StateAtSlotRegenerator<P: Preset, S: BeaconState> {
    queue: CachingTaskQueue<StateAtSlotTask<P, S>>,
    collaborators: Arc<Collaborators<S>>,
}

impl<P: Preset, S: BeaconState> StateAtSlotRegenerator<P, S> {
    #[must_use]
    pub fn new(
        config: QueueConfig,
        collaborators: Collaborators<S>,
        metrics: Option<Arc<TaskQueueMetrics>>,
    ) -> Self {
        Self {
            queue: CachingTaskQueue::new(config, metrics),
            collaborators: Arc::new(collaborators),
        }
    }

    pub async fn state_at_slot(&self, slot_and_block_root: SlotAndBlockRoot) -> Result<Arc<S>> {
        let task = StateAtSlotTask::new(slot_and_block_root, Arc::clone(&self.collaborators));
        self.queue.perform(task).await
    }

    pub async fn checkpoint_state(&self, checkpoint: Checkpoint) -> Result<Arc<S>> {
        let Checkpoint { epoch, root } = checkpoint;
        let slot = misc::compute_start_slot_at_epoch::<P>(epoch);

        self.state_at_slot(SlotAndBlockRoot::new(slot, root)).await
    }

    #[must_use]
    pub fn cached_state(&self, slot_and_block_root: SlotAndBlockRoot) -> Option<Arc<S>> {
        self.queue.get_if_available(slot_and_block_root)
    }

    /// Makes `state` available as a starting point for later requests for `block_root`.
    pub fn insert(&self, block_root: H256, state: Arc<S>) {
        let key = SlotAndBlockRoot::new(state.slot(), block_root);
        self.queue.cache(key, state);
    }

    /// Drops cached states older than `slot`.
    ///
    /// Computations already in flight are not affected.
    pub fn prune_before(&self, slot: Slot) {
        debug!("pruning cached states before slot {slot}");
        self.queue.prune(|key| key.slot < slot);
    }

    #[must_use]
    pub const fn queue(&self) -> &CachingTaskQueue<StateAtSlotTask<P, S>> {
        &self.queue
    }
}
