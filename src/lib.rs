//! Predicated scatter of lane-local tiles into a shared destination buffer.
//!
//! This crate is the store stage beneath bulk-parallel kernels (graph
//! traversal, relaxation, frontier compaction): every element such a kernel
//! produces reaches memory through a tile scatter. A tile is `LOADS × VEC`
//! values per lane over `LANES` lanes, all fixed at compile time; values go to
//! `dest + offsets[load][vec]`, optionally filtered by per-element flags and
//! by a runtime partial-tile size, optionally transformed in place first.
//!
//! # Core Types
//!
//! - [`TileScatter`]: per-lane façade with the four call shapes
//!   (`scatter`, `scatter_with`, `scatter_flagged`, `scatter_flagged_with`)
//! - [`TileGeometry`] / [`Tile`]: tile shape constants and tile-rank arithmetic
//! - [`TileTransform`] with [`Identity`], [`Conj`], [`Negate`] and closures
//! - [`StoreHint`] markers ([`StoreDefault`], [`StoreWb`], [`StoreCg`],
//!   [`StoreCs`], [`StoreWt`], [`StoreVolatile`]) selecting the cache hint
//!
//! # Host Launchers
//!
//! - [`BlockScatter`]: runs one tile over all lanes against a `&mut [T]`,
//!   checking offsets and partial size first
//! - [`RangeScatter`]: cuts flat slices into tiles (ragged tail as a partial
//!   tile) and scatters them, on rayon when the `parallel` feature is enabled
//!
//! # Example
//!
//! ```rust
//! use tile_scatter::TileScatter;
//!
//! // 2 loads of 8 slots, one lane: capacity 16
//! let data: [[u32; 8]; 2] = [[0, 1, 2, 3, 4, 5, 6, 7], [8, 9, 10, 11, 12, 13, 14, 15]];
//! let offsets: [[usize; 8]; 2] = data.map(|row| row.map(|v| v as usize));
//! let mut dest = vec![0u32; 32];
//!
//! let lane: TileScatter<2, 8, 1> = TileScatter::new(0);
//! // Only the first 10 elements of the tile are valid.
//! unsafe { lane.scatter(dest.as_mut_ptr(), &data, &offsets, Some(10)) };
//!
//! assert_eq!(&dest[..10], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! assert!(dest[10..].iter().all(|&v| v == 0));
//! ```
//!
//! # Guarantees
//!
//! Exactly the admitted elements are written, each with one store; nothing is
//! deduplicated, nothing is atomic. Two lanes writing the same address leave
//! one of their values there, and which one is unspecified.

pub mod block;
pub mod engine;
pub mod geometry;
pub mod guard;
mod maybe_sync;
pub mod range;
pub mod scatter;
mod threading;
pub mod unroll;

pub use block::{BlockScatter, LaneTile};
pub use geometry::{Tile, TileGeometry, TilePosition};
pub use guard::{Bounded, ElementGuard, Flagged, Unguarded};
pub use maybe_sync::{MaybeSendSync, MaybeSync};
pub use range::RangeScatter;
pub use scatter::TileScatter;
pub use unroll::{Count, Unrolled};

pub use tile_scatter_traits::{
    CacheHint, Conj, ConjApply, Identity, Negate, ScatterOffset, StoreCg, StoreCs, StoreDefault,
    StoreHint, StoreVolatile, StoreWb, StoreWt, TileTransform,
};

// ============================================================================
// Constants
// ============================================================================

/// Minimum number of tiles before [`RangeScatter`] hands work to rayon.
///
/// Below this the fork/join cost outweighs the stores themselves.
pub const MIN_PARALLEL_TILES: usize = 64;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by the host launchers.
///
/// The per-lane façade never fails; these are caller obligations checked by
/// [`BlockScatter`] and [`RangeScatter`] before any store is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScatterError {
    /// The number of lane tiles does not match the lane count of the shape.
    #[error("lane count mismatch: expected {expected}, found {found}")]
    LaneCountMismatch { expected: usize, found: usize },

    /// Partial tile size larger than the tile capacity.
    #[error("partial tile size {size} exceeds tile capacity {capacity}")]
    PartialTileSizeOutOfRange { size: usize, capacity: usize },

    /// An admitted element addresses a cell outside the destination.
    #[error("offset {offset} at element {element} outside destination of length {len}")]
    OffsetOutOfBounds {
        element: usize,
        offset: isize,
        len: usize,
    },

    /// Parallel input slices have different lengths.
    #[error("{what} length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Result type for the host launchers.
pub type Result<T> = std::result::Result<T, ScatterError>;
