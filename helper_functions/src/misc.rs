use types::{
    phase0::primitives::{Epoch, Slot},
    preset::Preset,
};

#[must_use]
pub const fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot / P::SLOTS_PER_EPOCH.get()
}

#[must_use]
pub const fn compute_start_slot_at_epoch<P: Preset>(epoch: Epoch) -> Slot {
    epoch.saturating_mul(P::SLOTS_PER_EPOCH.get())
}

#[must_use]
pub const fn is_epoch_start<P: Preset>(slot: Slot) -> bool {
    slots_since_epoch_start::<P>(slot) == 0
}

#[must_use]
pub const fn slots_since_epoch_start<P: Preset>(slot: Slot) -> u64 {
    slot % P::SLOTS_PER_EPOCH.get()
}
