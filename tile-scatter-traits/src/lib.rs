//! Shared traits for the tile-scatter ecosystem.
//!
//! This crate holds the contracts that sit at the boundary of the scatter
//! primitive: the per-element transform hook, the single-element store with
//! its cache hint, and the offset element types accepted by the scatter
//! façade.
//!
//! Kernel crates can depend on `tile-scatter-traits` to implement these
//! traits for their own types without orphan rule violations.

pub mod offset;
pub mod store;
pub mod transform;

pub use offset::ScatterOffset;
pub use store::{
    CacheHint, StoreCg, StoreCs, StoreDefault, StoreHint, StoreVolatile, StoreWb, StoreWt,
};
pub use transform::{Conj, ConjApply, Identity, Negate, TileTransform};
