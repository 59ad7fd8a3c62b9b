use std::sync::Arc;

use anyhow::Error as AnyhowError;
use thiserror::Error;
use types::phase0::primitives::{Slot, H256};

// `anyhow::Error` is not `Clone`. Failures are shared between every caller waiting on a
// computation, so underlying errors are kept behind an `Arc`.
#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("no state available for block {block_root:?}")]
    MissingState { block_root: H256 },
    #[error(
        "state for block {block_root:?} is already at slot {state_slot}, \
         which is past the requested slot {slot}"
    )]
    InvalidCheckpoint {
        block_root: H256,
        state_slot: Slot,
        slot: Slot,
    },
    #[error("failed to advance state for block {block_root:?} to slot {slot}: {error:#}")]
    TransitionFailed {
        block_root: H256,
        slot: Slot,
        error: Arc<AnyhowError>,
    },
    #[error("failed to load state for block {block_root:?}: {error:#}")]
    StateProviderFailed {
        block_root: H256,
        error: Arc<AnyhowError>,
    },
}
