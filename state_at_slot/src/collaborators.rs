use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use types::phase0::{
    containers::Checkpoint,
    primitives::{Slot, H256},
};

/// Source of known states, such as the fork choice store or the database.
#[async_trait]
pub trait AncestorStateProvider<S>: Send + Sync {
    /// Returns `None` if no state is known for `block_root`.
    async fn state_by_block_root(&self, block_root: H256) -> Result<Option<Arc<S>>>;
}

pub trait TransitionReplayer<S>: Send + Sync {
    fn process_slots(&self, state: Arc<S>, slot: Slot) -> Result<Arc<S>>;
}

/// Produces checkpoint states.
///
/// The result must be the same state that [`TransitionReplayer::process_slots`] would produce for
/// the first slot of `checkpoint.epoch`.
pub trait CheckpointRegenerator<S>: Send + Sync {
    fn regenerate_checkpoint_state(
        &self,
        checkpoint: Checkpoint,
        base_state: Arc<S>,
    ) -> Result<Arc<S>>;
}

pub struct Collaborators<S> {
    pub state_provider: Arc<dyn AncestorStateProvider<S>>,
    pub transition_replayer: Arc<dyn TransitionReplayer<S>>,
    pub checkpoint_regenerator: Arc<dyn CheckpointRegenerator<S>>,
}
