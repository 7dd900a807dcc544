//! Scatter façade: the per-lane entry point.
//!
//! A [`TileScatter`] is bound to the calling lane and the tile shape. Each call
//! compares the partial tile size to the tile capacity once and then runs the
//! matching unrolled engine variant, so a full tile pays for no boundary
//! checks at all.
//!
//! # Caller obligations
//!
//! The primitive reports no errors. Callers must ensure:
//! - every admitted offset addresses a valid element of the destination;
//! - `partial_tile_size <= TILE_CAPACITY` (asserted in debug builds);
//! - lanes writing concurrently target distinct addresses if a deterministic
//!   result is required. Colliding writes leave one of the written values in
//!   the cell, which one is unspecified.

use std::marker::PhantomData;

use tile_scatter_traits::{Identity, ScatterOffset, StoreDefault, StoreHint, TileTransform};

use crate::engine;
use crate::geometry::{Tile, TileGeometry};
use crate::unroll::{Count, Unrolled};

/// Scatter of one lane's `LOADS × VEC` tile slice, stored with hint `H`.
#[derive(Debug, Clone, Copy)]
pub struct TileScatter<const LOADS: usize, const VEC: usize, const LANES: usize, H = StoreDefault> {
    lane: usize,
    _hint: PhantomData<H>,
}

impl<const LOADS: usize, const VEC: usize, const LANES: usize, H> TileScatter<LOADS, VEC, LANES, H>
where
    H: StoreHint,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    /// Shape of the tile.
    pub const GEOMETRY: TileGeometry = Tile::<LOADS, VEC, LANES>::GEOMETRY;

    /// Number of elements in a full tile across all lanes.
    pub const TILE_CAPACITY: usize = Tile::<LOADS, VEC, LANES>::TILE_CAPACITY;

    /// Bind the façade to `lane`, `0 <= lane < LANES`.
    #[inline(always)]
    pub fn new(lane: usize) -> Self {
        debug_assert!(lane < LANES, "lane {} out of range for {} lanes", lane, LANES);
        Self {
            lane,
            _hint: PhantomData,
        }
    }

    #[inline(always)]
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Resolve the optional partial size; `Some` only for a strictly partial tile.
    #[inline(always)]
    fn partial(partial_tile_size: Option<usize>) -> Option<usize> {
        let size = partial_tile_size.unwrap_or(Self::TILE_CAPACITY);
        debug_assert!(
            size <= Self::TILE_CAPACITY,
            "partial tile size {size} exceeds tile capacity {}",
            Self::TILE_CAPACITY
        );
        (size < Self::TILE_CAPACITY).then_some(size)
    }

    /// Write `data[load][vec]` to `dest + offsets[load][vec]` for every element
    /// of this lane inside the tile's valid range. `None` means a full tile.
    ///
    /// # Safety
    /// Every offset of an element with `tile_rank < partial_tile_size` must
    /// address a valid, writable element relative to `dest`.
    #[inline(always)]
    pub unsafe fn scatter<T, O>(
        &self,
        dest: *mut T,
        data: &[[T; VEC]; LOADS],
        offsets: &[[O; VEC]; LOADS],
        partial_tile_size: Option<usize>,
    ) where
        T: Copy,
        O: ScatterOffset,
    {
        let mut data = *data;
        unsafe { self.scatter_with(dest, &mut data, offsets, &mut Identity, partial_tile_size) }
    }

    /// As [`scatter`](Self::scatter), applying `transform` to each written
    /// element in place just before it is stored.
    ///
    /// # Safety
    /// See [`scatter`](Self::scatter).
    #[inline(always)]
    pub unsafe fn scatter_with<T, O, X>(
        &self,
        dest: *mut T,
        data: &mut [[T; VEC]; LOADS],
        offsets: &[[O; VEC]; LOADS],
        transform: &mut X,
        partial_tile_size: Option<usize>,
    ) where
        T: Copy,
        O: ScatterOffset,
        X: TileTransform<T>,
    {
        match Self::partial(partial_tile_size) {
            Some(size) => unsafe {
                engine::scatter_bounded::<T, O, H, X, LOADS, VEC, LANES>(
                    dest,
                    data,
                    offsets,
                    transform,
                    self.lane,
                    size,
                )
            },
            None => unsafe {
                engine::scatter_unguarded::<T, O, H, X, LOADS, VEC>(dest, data, offsets, transform)
            },
        }
    }

    /// Write only the elements whose flag is set (and that lie inside the
    /// valid range of a partial tile).
    ///
    /// # Safety
    /// Every offset of an admitted element must address a valid, writable
    /// element relative to `dest`.
    #[inline(always)]
    pub unsafe fn scatter_flagged<T, O>(
        &self,
        dest: *mut T,
        data: &[[T; VEC]; LOADS],
        flags: &[[bool; VEC]; LOADS],
        offsets: &[[O; VEC]; LOADS],
        partial_tile_size: Option<usize>,
    ) where
        T: Copy,
        O: ScatterOffset,
    {
        let mut data = *data;
        unsafe {
            self.scatter_flagged_with(dest, &mut data, flags, offsets, &mut Identity, partial_tile_size)
        }
    }

    /// As [`scatter_flagged`](Self::scatter_flagged), applying `transform` to
    /// each admitted element in place just before it is stored.
    ///
    /// # Safety
    /// See [`scatter_flagged`](Self::scatter_flagged).
    #[inline(always)]
    pub unsafe fn scatter_flagged_with<T, O, X>(
        &self,
        dest: *mut T,
        data: &mut [[T; VEC]; LOADS],
        flags: &[[bool; VEC]; LOADS],
        offsets: &[[O; VEC]; LOADS],
        transform: &mut X,
        partial_tile_size: Option<usize>,
    ) where
        T: Copy,
        O: ScatterOffset,
        X: TileTransform<T>,
    {
        match Self::partial(partial_tile_size) {
            Some(size) => unsafe {
                engine::scatter_flagged_bounded::<T, O, H, X, LOADS, VEC, LANES>(
                    dest,
                    data,
                    flags,
                    offsets,
                    transform,
                    self.lane,
                    size,
                )
            },
            None => unsafe {
                engine::scatter_flagged::<T, O, H, X, LOADS, VEC>(
                    dest,
                    data,
                    flags,
                    offsets,
                    transform,
                )
            },
        }
    }
}
