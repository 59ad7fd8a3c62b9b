use crate::phase0::primitives::Slot;

/// A state snapshot that can be advanced slot by slot.
///
/// Implementors are treated as immutable once shared.
/// Anything that needs a modified copy goes through [`Arc::make_mut`](std::sync::Arc::make_mut).
pub trait BeaconState: Send + Sync + 'static {
    fn slot(&self) -> Slot;
}
