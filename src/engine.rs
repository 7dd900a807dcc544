//! Unrolled iteration engine.
//!
//! One generic traversal over the `(load, vec)` space of a lane's tile, `vec`
//! varying fastest. For each element the guard is evaluated; when it admits
//! the element, the transform mutates the lane-local value in place and the
//! value is stored to `dest + offsets[load][vec]` with the hint `H`.
//!
//! The traversal is expanded by [`Count`](crate::unroll::Count), so a
//! monomorphized instance is straight-line code. With `Unguarded` or
//! `Flagged` there is no loop control at all; the `Bounded` variants add one
//! comparison per element against the runtime partial tile size.

use tile_scatter_traits::{ScatterOffset, StoreHint, TileTransform};

use crate::guard::{Bounded, ElementGuard, Flagged, Unguarded};
use crate::unroll::{Count, Unrolled};

/// Scatter one lane's tile through an arbitrary guard.
///
/// # Safety
/// For every element admitted by `guard`, `dest.offset(offsets[load][vec])`
/// must be valid for writes of `T`. Other lanes may write the same buffer
/// concurrently only at disjoint addresses.
#[inline(always)]
pub unsafe fn scatter_guarded<T, O, H, X, G, const LOADS: usize, const VEC: usize>(
    dest: *mut T,
    data: &mut [[T; VEC]; LOADS],
    offsets: &[[O; VEC]; LOADS],
    guard: &G,
    transform: &mut X,
) where
    T: Copy,
    O: ScatterOffset,
    H: StoreHint,
    X: TileTransform<T>,
    G: ElementGuard<LOADS, VEC>,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    Count::<LOADS>::for_each(|load| {
        Count::<VEC>::for_each(|vec| {
            if <G as ElementGuard<LOADS, VEC>>::ALWAYS || guard.admits(load, vec) {
                let value = &mut data[load][vec];
                transform.apply(value);
                unsafe { H::store(dest.offset(offsets[load][vec].to_isize()), *value) };
            }
        });
    });
}

/// Write every element.
///
/// # Safety
/// See [`scatter_guarded`].
#[inline(always)]
pub unsafe fn scatter_unguarded<T, O, H, X, const LOADS: usize, const VEC: usize>(
    dest: *mut T,
    data: &mut [[T; VEC]; LOADS],
    offsets: &[[O; VEC]; LOADS],
    transform: &mut X,
) where
    T: Copy,
    O: ScatterOffset,
    H: StoreHint,
    X: TileTransform<T>,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    unsafe { scatter_guarded::<T, O, H, X, _, LOADS, VEC>(dest, data, offsets, &Unguarded, transform) }
}

/// Write the elements of `lane` whose tile rank is below `partial_tile_size`.
///
/// # Safety
/// See [`scatter_guarded`].
#[inline(always)]
pub unsafe fn scatter_bounded<T, O, H, X, const LOADS: usize, const VEC: usize, const LANES: usize>(
    dest: *mut T,
    data: &mut [[T; VEC]; LOADS],
    offsets: &[[O; VEC]; LOADS],
    transform: &mut X,
    lane: usize,
    partial_tile_size: usize,
) where
    T: Copy,
    O: ScatterOffset,
    H: StoreHint,
    X: TileTransform<T>,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    let guard = Bounded::<Unguarded, LANES>::new(Unguarded, lane, partial_tile_size);
    unsafe { scatter_guarded::<T, O, H, X, _, LOADS, VEC>(dest, data, offsets, &guard, transform) }
}

/// Write the elements whose flag is set.
///
/// # Safety
/// See [`scatter_guarded`].
#[inline(always)]
pub unsafe fn scatter_flagged<T, O, H, X, const LOADS: usize, const VEC: usize>(
    dest: *mut T,
    data: &mut [[T; VEC]; LOADS],
    flags: &[[bool; VEC]; LOADS],
    offsets: &[[O; VEC]; LOADS],
    transform: &mut X,
) where
    T: Copy,
    O: ScatterOffset,
    H: StoreHint,
    X: TileTransform<T>,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    let guard = Flagged::new(flags);
    unsafe { scatter_guarded::<T, O, H, X, _, LOADS, VEC>(dest, data, offsets, &guard, transform) }
}

/// Write the elements whose flag is set and whose tile rank is below
/// `partial_tile_size`.
///
/// # Safety
/// See [`scatter_guarded`].
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn scatter_flagged_bounded<
    T,
    O,
    H,
    X,
    const LOADS: usize,
    const VEC: usize,
    const LANES: usize,
>(
    dest: *mut T,
    data: &mut [[T; VEC]; LOADS],
    flags: &[[bool; VEC]; LOADS],
    offsets: &[[O; VEC]; LOADS],
    transform: &mut X,
    lane: usize,
    partial_tile_size: usize,
) where
    T: Copy,
    O: ScatterOffset,
    H: StoreHint,
    X: TileTransform<T>,
    Count<LOADS>: Unrolled,
    Count<VEC>: Unrolled,
{
    let guard = Bounded::<_, LANES>::new(Flagged::new(flags), lane, partial_tile_size);
    unsafe { scatter_guarded::<T, O, H, X, _, LOADS, VEC>(dest, data, offsets, &guard, transform) }
}
