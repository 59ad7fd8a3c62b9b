use derive_more::{Constructor, Display};

use crate::phase0::primitives::{Slot, H256};

/// Identifies the state produced by processing empty slots on top of a block up to `slot`.
///
/// Ordered by slot first, then by block root.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Display, Constructor,
)]
#[display("{block_root:?} at slot {slot}")]
pub struct SlotAndBlockRoot {
    pub slot: Slot,
    pub block_root: H256,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const ROOT_1: H256 = H256::repeat_byte(1);
    const ROOT_2: H256 = H256::repeat_byte(2);

    #[test_case(
        SlotAndBlockRoot::new(1, ROOT_2),
        SlotAndBlockRoot::new(2, ROOT_1);
        "lower slot orders first regardless of root"
    )]
    #[test_case(
        SlotAndBlockRoot::new(2, ROOT_1),
        SlotAndBlockRoot::new(2, ROOT_2);
        "same slot orders by root"
    )]
    fn test_slot_and_block_root_ordering(lower: SlotAndBlockRoot, higher: SlotAndBlockRoot) {
        assert!(lower < higher);
        assert!(higher > lower);
    }
}
