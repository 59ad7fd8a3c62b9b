pub mod nonstandard;
pub mod preset;
pub mod traits;

pub mod phase0 {
    pub mod consts;
    pub mod containers;
    pub mod primitives;
}
