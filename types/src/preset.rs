use core::{fmt::Debug, hash::Hash, num::NonZeroU64};

use nonzero_ext::nonzero;

/// Compile-time configuration variables.
///
/// Only the variables that slot and epoch arithmetic depends on are included.
/// See [presets in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/dev/presets).
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    const SLOTS_PER_EPOCH: NonZeroU64;
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Mainnet {
    const SLOTS_PER_EPOCH: NonZeroU64 = nonzero!(32_u64);
}

impl Preset for Minimal {
    const SLOTS_PER_EPOCH: NonZeroU64 = nonzero!(8_u64);
}
