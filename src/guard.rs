//! Per-element write predicates.
//!
//! The four guard variants of the scatter are compositions of three types:
//!
//! | Variant          | Guard type               | Predicate                         |
//! |------------------|--------------------------|-----------------------------------|
//! | unguarded        | `Unguarded`              | always                            |
//! | partial-boundary | `Bounded<Unguarded, L>`  | `tile_rank < partial_tile_size`   |
//! | flag-guarded     | `Flagged`                | `flags[load][vec]`                |
//! | flag + boundary  | `Bounded<Flagged, L>`    | both                              |
//!
//! `Unguarded` folds to `true` after monomorphization, so the full-tile paths
//! carry no per-element test at all.

use crate::geometry::Tile;

/// Decides whether the element at `(load, vec)` of the calling lane is written.
pub trait ElementGuard<const LOADS: usize, const VEC: usize> {
    /// Whether [`admits`](Self::admits) is constant `true`.
    const ALWAYS: bool = false;

    fn admits(&self, load: usize, vec: usize) -> bool;
}

/// Every element is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unguarded;

impl<const LOADS: usize, const VEC: usize> ElementGuard<LOADS, VEC> for Unguarded {
    const ALWAYS: bool = true;

    #[inline(always)]
    fn admits(&self, _load: usize, _vec: usize) -> bool {
        true
    }
}

/// An element is written iff its validity flag is set.
#[derive(Debug, Clone, Copy)]
pub struct Flagged<'a, const LOADS: usize, const VEC: usize> {
    flags: &'a [[bool; VEC]; LOADS],
}

impl<'a, const LOADS: usize, const VEC: usize> Flagged<'a, LOADS, VEC> {
    #[inline(always)]
    pub fn new(flags: &'a [[bool; VEC]; LOADS]) -> Self {
        Self { flags }
    }
}

impl<const LOADS: usize, const VEC: usize> ElementGuard<LOADS, VEC> for Flagged<'_, LOADS, VEC> {
    #[inline(always)]
    fn admits(&self, load: usize, vec: usize) -> bool {
        self.flags[load][vec]
    }
}

/// Conjunction of an inner guard with the partial-tile boundary of one lane.
#[derive(Debug, Clone, Copy)]
pub struct Bounded<G, const LANES: usize> {
    inner: G,
    lane: usize,
    partial_tile_size: usize,
}

impl<G, const LANES: usize> Bounded<G, LANES> {
    #[inline(always)]
    pub fn new(inner: G, lane: usize, partial_tile_size: usize) -> Self {
        Self {
            inner,
            lane,
            partial_tile_size,
        }
    }
}

impl<G, const LOADS: usize, const VEC: usize, const LANES: usize> ElementGuard<LOADS, VEC>
    for Bounded<G, LANES>
where
    G: ElementGuard<LOADS, VEC>,
{
    #[inline(always)]
    fn admits(&self, load: usize, vec: usize) -> bool {
        self.inner.admits(load, vec)
            && Tile::<LOADS, VEC, LANES>::tile_rank(self.lane, load, vec) < self.partial_tile_size
    }
}
