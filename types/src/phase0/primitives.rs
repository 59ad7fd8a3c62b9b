pub use ethereum_types::H256;

pub type Epoch = u64;
pub type Slot = u64;
