//! Tile shape and tile-rank arithmetic.
//!
//! A tile is `LOADS × VEC` elements per lane spread over `LANES` lanes. All
//! three factors are powers of two. Elements are numbered by *tile rank*:
//!
//! ```text
//! rank(lane, load, vec) = lane * VEC + load * LANES * VEC + vec
//! ```
//!
//! so that for a fixed `(load, vec)` the lanes' elements sit next to each other
//! and a lockstep group touches one contiguous run per load.

/// Position of an element inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePosition {
    pub lane: usize,
    pub load: usize,
    pub vec: usize,
}

/// Immutable shape configuration of one tile instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGeometry {
    pub log_loads_per_tile: u32,
    pub log_vector_size: u32,
    pub active_lanes: usize,
    pub loads_per_tile: usize,
    pub vector_size: usize,
    pub elements_per_lane: usize,
    pub tile_capacity: usize,
}

impl TileGeometry {
    /// Build the geometry from log2 of loads-per-tile, log2 of the vector
    /// size and the number of active lanes.
    ///
    /// Panics (at compile time when used in a const) if `active_lanes` is not
    /// a power of two.
    pub const fn from_log2(log_loads_per_tile: u32, log_vector_size: u32, active_lanes: usize) -> Self {
        assert!(
            active_lanes.is_power_of_two(),
            "active lane count must be a power of two"
        );
        let loads_per_tile = 1usize << log_loads_per_tile;
        let vector_size = 1usize << log_vector_size;
        let elements_per_lane = loads_per_tile * vector_size;
        Self {
            log_loads_per_tile,
            log_vector_size,
            active_lanes,
            loads_per_tile,
            vector_size,
            elements_per_lane,
            tile_capacity: active_lanes * elements_per_lane,
        }
    }

    /// Build the geometry from the factors themselves.
    pub const fn new(loads_per_tile: usize, vector_size: usize, active_lanes: usize) -> Self {
        assert!(
            loads_per_tile.is_power_of_two(),
            "loads per tile must be a power of two"
        );
        assert!(
            vector_size.is_power_of_two(),
            "vector size must be a power of two"
        );
        Self::from_log2(
            loads_per_tile.trailing_zeros(),
            vector_size.trailing_zeros(),
            active_lanes,
        )
    }

    /// Flattened, coalescing-friendly index of `(lane, load, vec)`.
    #[inline(always)]
    pub const fn tile_rank(&self, lane: usize, load: usize, vec: usize) -> usize {
        (lane << self.log_vector_size)
            + load * (self.active_lanes << self.log_vector_size)
            + vec
    }

    /// Inverse of [`tile_rank`](Self::tile_rank) for `rank < tile_capacity`.
    #[inline]
    pub const fn position(&self, rank: usize) -> TilePosition {
        let stride = self.active_lanes << self.log_vector_size;
        let within = rank % stride;
        TilePosition {
            lane: within >> self.log_vector_size,
            load: rank / stride,
            vec: within & (self.vector_size - 1),
        }
    }

    /// Number of tiles needed to cover `len` elements.
    #[inline]
    pub const fn tile_count(&self, len: usize) -> usize {
        len.div_ceil(self.tile_capacity)
    }

    /// Valid element count of tile `tile_index` in a range of `len` elements.
    ///
    /// Equal to `tile_capacity` for every tile but a ragged last one, and 0 for
    /// tiles past the end.
    #[inline]
    pub const fn partial_tile_size(&self, len: usize, tile_index: usize) -> usize {
        let start = tile_index.saturating_mul(self.tile_capacity);
        if start >= len {
            0
        } else {
            let rest = len - start;
            if rest < self.tile_capacity {
                rest
            } else {
                self.tile_capacity
            }
        }
    }
}

/// Type-level tile shape: `LOADS` loads of `VEC` slots per lane, `LANES` lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile<const LOADS: usize, const VEC: usize, const LANES: usize>;

impl<const LOADS: usize, const VEC: usize, const LANES: usize> Tile<LOADS, VEC, LANES> {
    /// Geometry of this shape, evaluated once per instantiation.
    pub const GEOMETRY: TileGeometry = TileGeometry::new(LOADS, VEC, LANES);

    /// `LOADS * VEC`
    pub const ELEMENTS_PER_LANE: usize = Self::GEOMETRY.elements_per_lane;

    /// `LANES * LOADS * VEC`
    pub const TILE_CAPACITY: usize = Self::GEOMETRY.tile_capacity;

    #[inline(always)]
    pub const fn tile_rank(lane: usize, load: usize, vec: usize) -> usize {
        Self::GEOMETRY.tile_rank(lane, load, vec)
    }
}
