use core::{iter::FusedIterator, ops::Range};

use types::{
    nonstandard::SlotAndBlockRoot,
    phase0::{
        consts::GENESIS_SLOT,
        primitives::{Slot, H256},
    },
};

/// Slots below a target slot paired with the same block root, nearest first.
///
/// The last item is at [`GENESIS_SLOT`]. Items are produced lazily, so the number of slots does not
/// affect memory usage.
#[derive(Clone, Debug)]
pub struct BackwardSteps {
    block_root: H256,
    slots: Range<Slot>,
}

impl BackwardSteps {
    #[must_use]
    pub const fn new(target: SlotAndBlockRoot) -> Self {
        let SlotAndBlockRoot { slot, block_root } = target;

        Self {
            block_root,
            slots: GENESIS_SLOT..slot,
        }
    }
}

impl Iterator for BackwardSteps {
    type Item = SlotAndBlockRoot;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .next_back()
            .map(|slot| SlotAndBlockRoot::new(slot, self.block_root))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl FusedIterator for BackwardSteps {}
