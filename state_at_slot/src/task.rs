use core::{cmp::Ordering, marker::PhantomData};
use std::sync::Arc;

use anyhow::{Error as AnyhowError, Result};
use async_trait::async_trait;
use caching_task_queue::CacheableTask;
use derivative::Derivative;
use helper_functions::misc;
use tracing::{debug, instrument};
use types::{
    nonstandard::SlotAndBlockRoot,
    phase0::containers::Checkpoint,
    preset::Preset,
    traits::BeaconState,
};

use crate::{collaborators::Collaborators, error::Error, steps::BackwardSteps};

/// Computes the state at `slot_and_block_root.slot` by processing empty slots on top of the state
/// of `slot_and_block_root.block_root`.
///
/// A task created by [`CacheableTask::rebase`] starts from the supplied state and never consults
/// the state provider.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct StateAtSlotTask<P: Preset, S: BeaconState> {
    slot_and_block_root: SlotAndBlockRoot,
    collaborators: Arc<Collaborators<S>>,
    base_state: Option<Arc<S>>,
    phantom: PhantomData<P>,
}

impl<P: Preset, S: BeaconState> StateAtSlotTask<P, S> {
    #[must_use]
    pub const fn new(
        slot_and_block_root: SlotAndBlockRoot,
        collaborators: Arc<Collaborators<S>>,
    ) -> Self {
        Self {
            slot_and_block_root,
            collaborators,
            base_state: None,
            phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn is_rebased(&self) -> bool {
        self.base_state.is_some()
    }

    async fn load_base_state(&self) -> Result<Arc<S>, Error> {
        if let Some(base_state) = self.base_state.as_ref() {
            return Ok(Arc::clone(base_state));
        }

        let block_root = self.slot_and_block_root.block_root;

        self.collaborators
            .state_provider
            .state_by_block_root(block_root)
            .await
            .map_err(|error| Error::StateProviderFailed {
                block_root,
                error: Arc::new(error),
            })?
            .ok_or(Error::MissingState { block_root })
    }

    async fn regenerate_from(&self, base_state: Arc<S>) -> Result<Arc<S>, Error> {
        let SlotAndBlockRoot { slot, block_root } = self.slot_and_block_root;
        let state_slot = base_state.slot();

        match state_slot.cmp(&slot) {
            Ordering::Equal => return Ok(base_state),
            Ordering::Greater => {
                return Err(Error::InvalidCheckpoint {
                    block_root,
                    state_slot,
                    slot,
                })
            }
            Ordering::Less => {}
        }

        // The base state was obtained for `block_root` either directly or through an ancestor key
        // with the same root, so `block_root` is the root the checkpoint depends on.
        let checkpoint = misc::is_epoch_start::<P>(slot).then(|| Checkpoint {
            epoch: misc::compute_epoch_at_slot::<P>(slot),
            root: block_root,
        });

        debug!(
            "advancing state for block {block_root:?} from slot {state_slot} to slot {slot} \
             (checkpoint: {checkpoint:?})",
        );

        let collaborators = Arc::clone(&self.collaborators);

        spawn_blocking(move || match checkpoint {
            Some(checkpoint) => collaborators
                .checkpoint_regenerator
                .regenerate_checkpoint_state(checkpoint, base_state),
            None => collaborators
                .transition_replayer
                .process_slots(base_state, slot),
        })
        .await
        .map_err(|error| Error::TransitionFailed {
            block_root,
            slot,
            error: Arc::new(error),
        })
    }
}

#[async_trait]
impl<P: Preset, S: BeaconState> CacheableTask for StateAtSlotTask<P, S> {
    type Key = SlotAndBlockRoot;
    type Value = Arc<S>;
    type Error = Error;
    type BackwardSteps = BackwardSteps;

    fn key(&self) -> SlotAndBlockRoot {
        self.slot_and_block_root
    }

    fn backward_steps(&self) -> BackwardSteps {
        BackwardSteps::new(self.slot_and_block_root)
    }

    fn rebase(&self, base_state: Arc<S>) -> Self {
        Self {
            base_state: Some(base_state),
            ..self.clone()
        }
    }

    #[instrument(
        skip_all,
        level = "debug",
        name = "StateAtSlotTask::perform",
        fields(target = %self.slot_and_block_root, rebased = self.is_rebased()),
    )]
    async fn perform(self) -> Result<Arc<S>, Error> {
        let base_state = self.load_base_state().await?;
        self.regenerate_from(base_state).await
    }
}

// Slot processing is CPU-bound and must not block the async runtime.
async fn spawn_blocking<T: Send + 'static>(
    function: impl FnOnce() -> Result<T> + Send + 'static,
) -> Result<T> {
    tokio::task::spawn_blocking(function)
        .await
        .map_err(AnyhowError::new)?
}
