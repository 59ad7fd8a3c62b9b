use crate::phase0::primitives::Slot;

pub const GENESIS_SLOT: Slot = 0;
