use core::sync::atomic::{AtomicUsize, Ordering};
use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, ensure, Result};
use async_trait::async_trait;
use helper_functions::misc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use types::{
    phase0::{
        containers::Checkpoint,
        primitives::{Slot, H256},
    },
    preset::Minimal,
    traits::BeaconState,
};

use crate::collaborators::{
    AncestorStateProvider, CheckpointRegenerator, Collaborators, TransitionReplayer,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TestState {
    pub slot: Slot,
    pub latest_block_root: H256,
}

impl BeaconState for TestState {
    fn slot(&self) -> Slot {
        self.slot
    }
}

pub fn state_at_slot(slot: Slot, latest_block_root: H256) -> Arc<TestState> {
    Arc::new(TestState {
        slot,
        latest_block_root,
    })
}

#[derive(Default)]
pub struct FakeStateProvider {
    states: Mutex<HashMap<H256, Arc<TestState>>>,
    lookups: AtomicUsize,
    gate: Option<Arc<Notify>>,
    failure: Option<&'static str>,
}

impl FakeStateProvider {
    pub fn with_state(self, block_root: H256, state: Arc<TestState>) -> Self {
        self.insert(block_root, state);
        self
    }

    pub fn gated(self, gate: &Arc<Notify>) -> Self {
        Self {
            gate: Some(Arc::clone(gate)),
            ..self
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::default()
        }
    }

    pub fn insert(&self, block_root: H256, state: Arc<TestState>) {
        self.states.lock().insert(block_root, state);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AncestorStateProvider<TestState> for FakeStateProvider {
    async fn state_by_block_root(&self, block_root: H256) -> Result<Option<Arc<TestState>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = self.gate.as_ref() {
            gate.notified().await;
        }

        if let Some(message) = self.failure {
            bail!("{message}");
        }

        Ok(self.states.lock().get(&block_root).cloned())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Call {
    ProcessSlots { from: Slot, to: Slot },
    RegenerateCheckpoint { from: Slot, checkpoint: Checkpoint },
}

#[derive(Default)]
pub struct FakeTransition {
    calls: Mutex<Vec<Call>>,
    rejected_slot: Option<Slot>,
}

impl FakeTransition {
    pub fn rejecting(rejected_slot: Slot) -> Self {
        Self {
            rejected_slot: Some(rejected_slot),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn advance(&self, mut state: Arc<TestState>, slot: Slot) -> Result<Arc<TestState>> {
        ensure!(
            state.slot < slot,
            "cannot advance state at slot {} to slot {slot}",
            state.slot,
        );

        if let Some(rejected_slot) = self.rejected_slot {
            ensure!(
                !(state.slot < rejected_slot && rejected_slot <= slot),
                "slot {rejected_slot} rejected",
            );
        }

        Arc::make_mut(&mut state).slot = slot;

        Ok(state)
    }
}

impl TransitionReplayer<TestState> for FakeTransition {
    fn process_slots(&self, state: Arc<TestState>, slot: Slot) -> Result<Arc<TestState>> {
        self.calls.lock().push(Call::ProcessSlots {
            from: state.slot,
            to: slot,
        });

        self.advance(state, slot)
    }
}

impl CheckpointRegenerator<TestState> for FakeTransition {
    fn regenerate_checkpoint_state(
        &self,
        checkpoint: Checkpoint,
        base_state: Arc<TestState>,
    ) -> Result<Arc<TestState>> {
        self.calls.lock().push(Call::RegenerateCheckpoint {
            from: base_state.slot,
            checkpoint,
        });

        let slot = misc::compute_start_slot_at_epoch::<Minimal>(checkpoint.epoch);

        self.advance(base_state, slot)
    }
}

pub fn collaborators(
    state_provider: &Arc<FakeStateProvider>,
    transition: &Arc<FakeTransition>,
) -> Collaborators<TestState> {
    Collaborators {
        state_provider: Arc::<FakeStateProvider>::clone(state_provider),
        transition_replayer: Arc::<FakeTransition>::clone(transition),
        checkpoint_regenerator: Arc::<FakeTransition>::clone(transition),
    }
}
