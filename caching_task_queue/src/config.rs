use core::num::NonZeroUsize;

use nonzero_ext::nonzero;
use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub max_cache_size: NonZeroUsize,
    // `None` probes every step down to the floor.
    // Probed with the bookkeeping lock held.
    pub max_ancestor_walk: Option<NonZeroUsize>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_cache_size: nonzero!(64_usize),
            max_ancestor_walk: Some(nonzero!(640_usize)),
        }
    }
}
