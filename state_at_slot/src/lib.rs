pub use crate::{
    collaborators::{
        AncestorStateProvider, CheckpointRegenerator, Collaborators, TransitionReplayer,
    },
    error::Error,
    regenerator::StateAtSlotRegenerator,
    steps::BackwardSteps,
    task::StateAtSlotTask,
};

mod collaborators;
mod error;
mod regenerator;
mod steps;
mod task;

#[cfg(test)]
mod test_utils;
