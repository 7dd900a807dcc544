//! Scatter of a flat data range, tile by tile.
//!
//! A range of `n` elements is cut into `ceil(n / TILE_CAPACITY)` tiles. The
//! element at flat position `tile * TILE_CAPACITY + rank` is handed to the lane
//! that owns `rank`, so each lane sees exactly the arrays a device kernel
//! would have loaded; the ragged last tile runs as a partial tile.
//!
//! With the `parallel` feature, tiles are distributed over the rayon pool when
//! there are at least [`MIN_PARALLEL_TILES`](crate::MIN_PARALLEL_TILES) of them
//! and no two admitted elements share a destination cell. Otherwise tiles run
//! in order on the calling thread.

use std::marker::PhantomData;

use tile_scatter_traits::{Identity, ScatterOffset, StoreDefault, StoreHint, TileTransform};

use crate::geometry::{Tile, TileGeometry};
use crate::maybe_sync::{MaybeSendSync, MaybeSync};
use crate::scatter::TileScatter;
use crate::threading::SendPtr;
use crate::unroll::{Count, Unrolled};
use crate::{Result, ScatterError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Range launcher for tiles of shape `LOADS × VEC × LANES`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeScatter<const LOADS: usize, const VEC: usize, const LANES: usize, H = StoreDefault> {
    _hint: PhantomData<H>,
}

impl<const LOADS: usize, const VEC: usize, const LANES: usize, H> RangeScatter<LOADS, VEC, LANES, H>
where
    H: StoreHint,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    pub const GEOMETRY: TileGeometry = Tile::<LOADS, VEC, LANES>::GEOMETRY;

    pub fn new() -> Self {
        Self { _hint: PhantomData }
    }

    /// Write `values[i]` to `dest[offsets[i]]` for every `i` whose flag is set
    /// (every `i` without flags).
    pub fn scatter_range<T, O>(
        &self,
        dest: &mut [T],
        values: &mut [T],
        offsets: &[O],
        flags: Option<&[bool]>,
    ) -> Result<()>
    where
        T: Copy + Default + MaybeSendSync,
        O: ScatterOffset + MaybeSync,
    {
        self.scatter_range_with(dest, values, offsets, flags, Identity)
    }

    /// As [`scatter_range`](Self::scatter_range), transforming each admitted
    /// value in place first. The transformed values are written back into
    /// `values`.
    ///
    /// Tiles run in order share one `transform`; on the parallel path it is
    /// cloned per rayon job.
    pub fn scatter_range_with<T, O, X>(
        &self,
        dest: &mut [T],
        values: &mut [T],
        offsets: &[O],
        flags: Option<&[bool]>,
        transform: X,
    ) -> Result<()>
    where
        T: Copy + Default + MaybeSendSync,
        O: ScatterOffset + MaybeSync,
        X: TileTransform<T> + Clone + MaybeSendSync,
    {
        check_len("offsets", values.len(), offsets.len())?;
        if let Some(flags) = flags {
            check_len("flags", values.len(), flags.len())?;
        }
        check_offsets(dest.len(), offsets, flags)?;

        let geometry = Self::GEOMETRY;
        let len = values.len();
        let tiles = geometry.tile_count(len);
        if tiles == 0 {
            return Ok(());
        }
        let tail = geometry.partial_tile_size(len, tiles - 1);

        #[cfg(feature = "parallel")]
        let parallel = crate::threading::should_run_parallel(tiles)
            && crate::threading::collision_free(dest.len(), admitted_cells(offsets, flags));
        #[cfg(not(feature = "parallel"))]
        let parallel = false;

        tracing::debug!(len, tiles, tail, parallel, capacity = geometry.tile_capacity, "scatter range");

        let dest = SendPtr(dest.as_mut_ptr());
        let capacity = geometry.tile_capacity;

        #[cfg(feature = "parallel")]
        {
            if parallel {
                values
                    .par_chunks_mut(capacity)
                    .enumerate()
                    .for_each_with(transform, |transform, (tile, chunk)| {
                        let start = tile * capacity;
                        let end = start + chunk.len();
                        // SAFETY: offsets are in bounds and pairwise distinct.
                        unsafe {
                            Self::scatter_tile(
                                dest,
                                chunk,
                                &offsets[start..end],
                                flags.map(|f| &f[start..end]),
                                transform,
                            )
                        }
                    });
                return Ok(());
            }
        }

        let mut transform = transform;
        for (tile, chunk) in values.chunks_mut(capacity).enumerate() {
            let start = tile * capacity;
            let end = start + chunk.len();
            // SAFETY: offsets are in bounds; tiles run one at a time.
            unsafe {
                Self::scatter_tile(
                    dest,
                    chunk,
                    &offsets[start..end],
                    flags.map(|f| &f[start..end]),
                    &mut transform,
                )
            }
        }
        Ok(())
    }

    /// Distribute one tile's slice over the lanes, scatter each lane and write
    /// the transformed values back.
    ///
    /// # Safety
    /// Every admitted offset must be in bounds of the buffer behind `dest`,
    /// and no other thread may write the same cells concurrently.
    unsafe fn scatter_tile<T, O, X>(
        dest: SendPtr<T>,
        values: &mut [T],
        offsets: &[O],
        flags: Option<&[bool]>,
        transform: &mut X,
    ) where
        T: Copy + Default,
        O: ScatterOffset,
        X: TileTransform<T>,
    {
        let geometry = Self::GEOMETRY;
        let valid = values.len();

        for lane in 0..LANES {
            let mut data = [[T::default(); VEC]; LOADS];
            let mut lane_offsets = [[O::ZERO; VEC]; LOADS];
            let mut lane_flags = [[false; VEC]; LOADS];
            for load in 0..LOADS {
                for vec in 0..VEC {
                    let rank = geometry.tile_rank(lane, load, vec);
                    if rank < valid {
                        data[load][vec] = values[rank];
                        lane_offsets[load][vec] = offsets[rank];
                        lane_flags[load][vec] = flags.map_or(true, |f| f[rank]);
                    }
                }
            }

            let facade = TileScatter::<LOADS, VEC, LANES, H>::new(lane);
            unsafe {
                if flags.is_some() {
                    facade.scatter_flagged_with(
                        dest.as_ptr(),
                        &mut data,
                        &lane_flags,
                        &lane_offsets,
                        transform,
                        Some(valid),
                    );
                } else {
                    facade.scatter_with(dest.as_ptr(), &mut data, &lane_offsets, transform, Some(valid));
                }
            }

            if !X::IS_IDENTITY {
                for load in 0..LOADS {
                    for vec in 0..VEC {
                        let rank = geometry.tile_rank(lane, load, vec);
                        if rank < valid {
                            values[rank] = data[load][vec];
                        }
                    }
                }
            }
        }
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ScatterError::LengthMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Fail on the first admitted element whose offset falls outside
/// `0..dest_len`.
fn check_offsets<O: ScatterOffset>(
    dest_len: usize,
    offsets: &[O],
    flags: Option<&[bool]>,
) -> Result<()> {
    for (element, &offset) in offsets.iter().enumerate() {
        if flags.is_some_and(|f| !f[element]) {
            continue;
        }
        if !offset.to_index().is_some_and(|index| index < dest_len) {
            return Err(ScatterError::OffsetOutOfBounds {
                element,
                offset: offset.to_isize(),
                len: dest_len,
            });
        }
    }
    Ok(())
}

/// Destination cells of the admitted elements. Offsets must have passed
/// [`check_offsets`].
#[cfg(feature = "parallel")]
fn admitted_cells<'a, O: ScatterOffset>(
    offsets: &'a [O],
    flags: Option<&'a [bool]>,
) -> impl Iterator<Item = usize> + 'a {
    offsets
        .iter()
        .enumerate()
        .filter(move |&(element, _)| flags.map_or(true, |f| f[element]))
        .filter_map(|(_, offset)| offset.to_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threading::collision_free;

    type Range = RangeScatter<2, 4, 2>;

    #[test]
    fn test_ragged_range() {
        // capacity 16; 37 elements -> two full tiles and a tail of 5
        let mut dest = vec![0i64; 40];
        let mut values: Vec<i64> = (0..37).map(|v| v * 3).collect();
        let offsets: Vec<u32> = (0..37).rev().collect();
        Range::new()
            .scatter_range(&mut dest, &mut values, &offsets, None)
            .unwrap();
        for i in 0..37usize {
            assert_eq!(dest[36 - i], (i as i64) * 3);
        }
        assert!(dest[37..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_flags_and_write_back() {
        let mut dest = vec![0i32; 20];
        let mut values: Vec<i32> = (1..=20).collect();
        let offsets: Vec<usize> = (0..20).collect();
        let flags: Vec<bool> = (0..20).map(|i| i % 3 == 0).collect();
        Range::new()
            .scatter_range_with(&mut dest, &mut values, &offsets, Some(&flags[..]), |v: &mut i32| {
                *v = -*v
            })
            .unwrap();
        for i in 0..20 {
            if i % 3 == 0 {
                assert_eq!(dest[i], -(i as i32 + 1));
                assert_eq!(values[i], -(i as i32 + 1));
            } else {
                assert_eq!(dest[i], 0);
                assert_eq!(values[i], i as i32 + 1);
            }
        }
    }

    #[test]
    fn test_empty_range() {
        let mut dest = vec![1u8; 4];
        Range::new()
            .scatter_range::<u8, u32>(&mut dest, &mut [], &[], None)
            .unwrap();
        assert_eq!(dest, vec![1; 4]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut dest = vec![0u8; 4];
        let err = Range::new()
            .scatter_range(&mut dest, &mut [1u8, 2], &[0u32], None)
            .unwrap_err();
        assert_eq!(
            err,
            ScatterError::LengthMismatch {
                what: "offsets",
                expected: 2,
                found: 1
            }
        );
        let err = Range::new()
            .scatter_range(&mut dest, &mut [1u8, 2], &[0u32, 1], Some(&[true][..]))
            .unwrap_err();
        assert!(matches!(err, ScatterError::LengthMismatch { what: "flags", .. }));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let mut dest = vec![0u8; 4];
        let err = Range::new()
            .scatter_range(&mut dest, &mut [1u8, 2], &[0i32, -2], None)
            .unwrap_err();
        assert_eq!(
            err,
            ScatterError::OffsetOutOfBounds {
                element: 1,
                offset: -2,
                len: 4
            }
        );
    }

    #[test]
    fn test_unflagged_out_of_bounds_offset_is_ignored() {
        let mut dest = vec![0u8; 2];
        Range::new()
            .scatter_range(&mut dest, &mut [1u8, 2], &[0u32, 99], Some(&[true, false][..]))
            .unwrap();
        assert_eq!(dest, vec![1, 0]);
    }

    #[test]
    fn test_many_tiles_with_collision_keep_one_value() {
        // large enough for the parallel gate; the collision must force tiles
        // back onto the calling thread
        let n = 16 * (crate::MIN_PARALLEL_TILES + 5);
        let mut dest = vec![0u32; n];
        let mut values: Vec<u32> = (1..=n as u32).collect();
        let mut offsets: Vec<usize> = (0..n).collect();
        offsets[3] = 7;
        assert!(!collision_free(n, offsets.iter().copied()));

        Range::new()
            .scatter_range(&mut dest, &mut values, &offsets, None)
            .unwrap();

        assert!([4, 8].contains(&dest[7]), "dest[7] = {}", dest[7]);
        assert_eq!(dest[3], 0);
        for i in (0..n).filter(|&i| i != 3 && i != 7) {
            assert_eq!(dest[i], i as u32 + 1, "cell {i}");
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_admitted_cells_skip_unflagged() {
        let offsets = [5u32, 1, 9, 2];
        let flags = [true, false, true, false];
        let cells: Vec<usize> = admitted_cells(&offsets, Some(&flags[..])).collect();
        assert_eq!(cells, vec![5, 9]);
        let all: Vec<usize> = admitted_cells(&offsets, None).collect();
        assert_eq!(all, vec![5, 1, 9, 2]);
    }

    #[test]
    fn test_check_offsets_reports_first_bad_admitted_element() {
        let offsets = [0i64, 8, -1, 3];
        assert_eq!(
            check_offsets(4, &offsets, Some(&[true, false, true, true][..])),
            Err(ScatterError::OffsetOutOfBounds {
                element: 2,
                offset: -1,
                len: 4
            })
        );
        assert!(check_offsets(4, &offsets, Some(&[true, false, false, true][..])).is_ok());
    }

    #[test]
    fn test_many_tiles_permuted() {
        // enough tiles to take the parallel path when it is enabled
        let n = 16 * (crate::MIN_PARALLEL_TILES + 3) + 7;
        let mut dest = vec![0u64; n];
        let mut values: Vec<u64> = (0..n as u64).collect();
        let offsets: Vec<usize> = (0..n).map(|i| (i * 7919) % n).collect();
        assert!(collision_free(n, offsets.iter().copied()), "n must be coprime to 7919");
        Range::new()
            .scatter_range_with(&mut dest, &mut values, &offsets, None, |v: &mut u64| *v += 1)
            .unwrap();
        for i in 0..n {
            assert_eq!(dest[offsets[i]], i as u64 + 1);
        }
    }
}
