//! Host-side emulation of one lockstep lane group scattering a tile.
//!
//! [`BlockScatter`] owns no data: it takes the lane-local tiles of all
//! `LANES` lanes and a destination slice, checks the caller obligations the
//! per-lane façade leaves unchecked, then runs the façade once per lane.

use std::marker::PhantomData;

use tile_scatter_traits::{Identity, ScatterOffset, StoreDefault, StoreHint, TileTransform};

use crate::geometry::{Tile, TileGeometry};
use crate::scatter::TileScatter;
use crate::unroll::{Count, Unrolled};
use crate::{Result, ScatterError};

/// Lane-local arrays of one lane: values, destination offsets and optional
/// validity flags, all `LOADS × VEC`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneTile<T, O, const LOADS: usize, const VEC: usize> {
    pub data: [[T; VEC]; LOADS],
    pub offsets: [[O; VEC]; LOADS],
    pub flags: Option<[[bool; VEC]; LOADS]>,
}

impl<T, O, const LOADS: usize, const VEC: usize> LaneTile<T, O, LOADS, VEC> {
    pub fn new(data: [[T; VEC]; LOADS], offsets: [[O; VEC]; LOADS]) -> Self {
        Self {
            data,
            offsets,
            flags: None,
        }
    }

    pub fn with_flags(mut self, flags: [[bool; VEC]; LOADS]) -> Self {
        self.flags = Some(flags);
        self
    }

    #[inline]
    fn flag(&self, load: usize, vec: usize) -> bool {
        self.flags.as_ref().map_or(true, |f| f[load][vec])
    }
}

/// Scatter of a whole tile (all lanes) into a destination slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockScatter<const LOADS: usize, const VEC: usize, const LANES: usize, H = StoreDefault> {
    _hint: PhantomData<H>,
}

impl<const LOADS: usize, const VEC: usize, const LANES: usize, H> BlockScatter<LOADS, VEC, LANES, H>
where
    H: StoreHint,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    pub const GEOMETRY: TileGeometry = Tile::<LOADS, VEC, LANES>::GEOMETRY;

    pub fn new() -> Self {
        Self { _hint: PhantomData }
    }

    /// Scatter every lane's tile with the identity transform.
    ///
    /// `partial_tile_size` of `None` means a full tile.
    pub fn scatter<T, O>(
        &self,
        dest: &mut [T],
        lanes: &mut [LaneTile<T, O, LOADS, VEC>],
        partial_tile_size: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        O: ScatterOffset,
    {
        self.scatter_with(dest, lanes, &mut Identity, partial_tile_size)
    }

    /// Scatter every lane's tile, transforming admitted values in place.
    ///
    /// Lanes are run one after another. Offsets shared by two lanes end up
    /// holding one of the two values; callers must not rely on which.
    pub fn scatter_with<T, O, X>(
        &self,
        dest: &mut [T],
        lanes: &mut [LaneTile<T, O, LOADS, VEC>],
        transform: &mut X,
        partial_tile_size: Option<usize>,
    ) -> Result<()>
    where
        T: Copy,
        O: ScatterOffset,
        X: TileTransform<T>,
    {
        self.validate(dest.len(), lanes, partial_tile_size)?;
        tracing::trace!(
            lanes = LANES,
            capacity = Self::GEOMETRY.tile_capacity,
            partial_tile_size = ?partial_tile_size,
            flagged = lanes.iter().filter(|l| l.flags.is_some()).count(),
            "scatter block"
        );

        let ptr = dest.as_mut_ptr();
        for (lane, tile) in lanes.iter_mut().enumerate() {
            let facade = TileScatter::<LOADS, VEC, LANES, H>::new(lane);
            // SAFETY: validate() checked every admitted offset against dest.len().
            match &tile.flags {
                Some(flags) => unsafe {
                    facade.scatter_flagged_with(
                        ptr,
                        &mut tile.data,
                        flags,
                        &tile.offsets,
                        transform,
                        partial_tile_size,
                    )
                },
                None => unsafe {
                    facade.scatter_with(ptr, &mut tile.data, &tile.offsets, transform, partial_tile_size)
                },
            }
        }
        Ok(())
    }

    fn validate<T, O: ScatterOffset>(
        &self,
        dest_len: usize,
        lanes: &[LaneTile<T, O, LOADS, VEC>],
        partial_tile_size: Option<usize>,
    ) -> Result<()> {
        if lanes.len() != LANES {
            return Err(ScatterError::LaneCountMismatch {
                expected: LANES,
                found: lanes.len(),
            });
        }
        let geometry = Self::GEOMETRY;
        let valid = partial_tile_size.unwrap_or(geometry.tile_capacity);
        if valid > geometry.tile_capacity {
            return Err(ScatterError::PartialTileSizeOutOfRange {
                size: valid,
                capacity: geometry.tile_capacity,
            });
        }
        for (lane, tile) in lanes.iter().enumerate() {
            for load in 0..LOADS {
                for vec in 0..VEC {
                    let rank = geometry.tile_rank(lane, load, vec);
                    if rank >= valid || !tile.flag(load, vec) {
                        continue;
                    }
                    let offset = tile.offsets[load][vec];
                    if !offset.to_index().is_some_and(|i| i < dest_len) {
                        return Err(ScatterError::OffsetOutOfBounds {
                            element: rank,
                            offset: offset.to_isize(),
                            len: dest_len,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
