use approx::assert_relative_eq;
use num_complex::Complex64;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tile_scatter::{
    BlockScatter, Conj, LaneTile, RangeScatter, StoreCg, Tile, TileScatter, TileTransform,
};

const LOADS: usize = 2;
const VEC: usize = 4;
const LANES: usize = 8;
const CAPACITY: usize = LANES * LOADS * VEC;

type Shape = Tile<LOADS, VEC, LANES>;
type Block = BlockScatter<LOADS, VEC, LANES>;

/// Build lane tiles where tile rank `r` carries `values[r]` and `offsets[r]`.
fn lanes_from_ranked<T: Copy + Default>(
    values: &[T],
    offsets: &[usize],
    flags: Option<&[bool]>,
) -> Vec<LaneTile<T, usize, LOADS, VEC>> {
    (0..LANES)
        .map(|lane| {
            let mut data = [[T::default(); VEC]; LOADS];
            let mut offs = [[0usize; VEC]; LOADS];
            let mut fl = [[false; VEC]; LOADS];
            for load in 0..LOADS {
                for vec in 0..VEC {
                    let rank = Shape::tile_rank(lane, load, vec);
                    data[load][vec] = values[rank];
                    offs[load][vec] = offsets[rank];
                    fl[load][vec] = flags.map_or(true, |f| f[rank]);
                }
            }
            let tile = LaneTile::new(data, offs);
            if flags.is_some() {
                tile.with_flags(fl)
            } else {
                tile
            }
        })
        .collect()
}

fn shuffled_offsets(rng: &mut StdRng, len: usize, dest_len: usize) -> Vec<usize> {
    let mut cells: Vec<usize> = (0..dest_len).collect();
    cells.shuffle(rng);
    cells.truncate(len);
    cells
}

#[test]
fn test_full_tile_identity_lands_every_value() {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<i64> = (0..CAPACITY).map(|_| rng.gen_range(-1000..1000)).collect();
    let offsets = shuffled_offsets(&mut rng, CAPACITY, 3 * CAPACITY);
    let mut dest = vec![0i64; 3 * CAPACITY];

    let mut lanes = lanes_from_ranked(&values, &offsets, None);
    Block::new().scatter(&mut dest, &mut lanes, None).unwrap();

    for (rank, &offset) in offsets.iter().enumerate() {
        assert_eq!(dest[offset], values[rank], "rank {rank}");
    }
}

#[test]
fn test_partial_tile_writes_exactly_the_prefix() {
    let mut rng = StdRng::seed_from_u64(11);
    let values: Vec<i32> = (1..=CAPACITY as i32).collect();
    let offsets = shuffled_offsets(&mut rng, CAPACITY, CAPACITY);

    for k in [0, 1, 7, 8, 33, CAPACITY - 1, CAPACITY] {
        let mut dest = vec![-1i32; CAPACITY];
        let mut lanes = lanes_from_ranked(&values, &offsets, None);
        Block::new().scatter(&mut dest, &mut lanes, Some(k)).unwrap();
        for (rank, &offset) in offsets.iter().enumerate() {
            let expected = if rank < k { values[rank] } else { -1 };
            assert_eq!(dest[offset], expected, "k={k} rank={rank}");
        }
    }
}

#[test]
fn test_flags_conjoined_with_boundary() {
    let mut rng = StdRng::seed_from_u64(13);
    let values: Vec<u32> = (100..100 + CAPACITY as u32).collect();
    let offsets: Vec<usize> = (0..CAPACITY).collect();
    let flags: Vec<bool> = (0..CAPACITY).map(|_| rng.gen_bool(0.5)).collect();

    for partial in [None, Some(40)] {
        let mut dest = vec![0u32; CAPACITY];
        let mut lanes = lanes_from_ranked(&values, &offsets, Some(&flags[..]));
        Block::new().scatter(&mut dest, &mut lanes, partial).unwrap();
        let bound = partial.unwrap_or(CAPACITY);
        for rank in 0..CAPACITY {
            let written = flags[rank] && rank < bound;
            let expected = if written { values[rank] } else { 0 };
            assert_eq!(dest[rank], expected, "partial={partial:?} rank={rank}");
        }
    }
}

#[test]
fn test_doubling_transform_is_visible_in_dest_and_source() {
    let values: Vec<f64> = (0..CAPACITY).map(|i| i as f64 * 0.25 + 1.0).collect();
    let offsets: Vec<usize> = (0..CAPACITY).rev().collect();
    let mut dest = vec![0.0f64; CAPACITY];

    let mut lanes = lanes_from_ranked(&values, &offsets, None);
    Block::new()
        .scatter_with(&mut dest, &mut lanes, &mut |v: &mut f64| *v *= 2.0, None)
        .unwrap();

    for (rank, &offset) in offsets.iter().enumerate() {
        assert_relative_eq!(dest[offset], values[rank] * 2.0, epsilon = 1e-12);
    }
    for (lane, tile) in lanes.iter().enumerate() {
        for load in 0..LOADS {
            for vec in 0..VEC {
                let rank = Shape::tile_rank(lane, load, vec);
                assert_relative_eq!(tile.data[load][vec], values[rank] * 2.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_repeated_call_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(17);
    let values: Vec<u64> = (0..CAPACITY).map(|_| rng.gen()).collect();
    let offsets = shuffled_offsets(&mut rng, CAPACITY, 2 * CAPACITY);

    let mut once = vec![0u64; 2 * CAPACITY];
    Block::new()
        .scatter(&mut once, &mut lanes_from_ranked(&values, &offsets, None), Some(50))
        .unwrap();

    let mut twice = once.clone();
    Block::new()
        .scatter(&mut twice, &mut lanes_from_ranked(&values, &offsets, None), Some(50))
        .unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_colliding_offsets_leave_one_of_the_values() {
    let values: Vec<i32> = (0..CAPACITY as i32).map(|v| v + 1).collect();
    let mut offsets: Vec<usize> = (0..CAPACITY).collect();
    // lanes 1 and 5 both target cell 3 through their first slot
    let a = Shape::tile_rank(1, 0, 0);
    let b = Shape::tile_rank(5, 0, 0);
    offsets[a] = 3;
    offsets[b] = 3;
    let mut flags = vec![false; CAPACITY];
    flags[a] = true;
    flags[b] = true;

    let mut dest = vec![0i32; CAPACITY];
    let mut lanes = lanes_from_ranked(&values, &offsets, Some(&flags[..]));
    Block::new().scatter(&mut dest, &mut lanes, None).unwrap();

    assert!([values[a], values[b]].contains(&dest[3]));
    assert_eq!(dest.iter().filter(|&&v| v != 0).count(), 1);
}

#[test]
fn test_capacity_sixteen_partial_ten() {
    // 2 loads x 8 slots on one lane; identity offsets and values, k = 10
    let data: [[u32; 8]; 2] = [[0, 1, 2, 3, 4, 5, 6, 7], [8, 9, 10, 11, 12, 13, 14, 15]];
    let offsets = data.map(|row| row.map(|v| v as usize));
    let mut dest = vec![0u32; 32];

    let lane: TileScatter<2, 8, 1> = TileScatter::new(0);
    unsafe { lane.scatter(dest.as_mut_ptr(), &data, &offsets, Some(10)) };

    for i in 0..10 {
        assert_eq!(dest[i], i as u32);
    }
    assert!(dest[10..].iter().all(|&v| v == 0));
}

#[test]
fn test_capacity_sixteen_partial_ten_across_lanes() {
    // same capacity spread over 2 lanes of 2 loads x 4 slots
    let mut dest = vec![0u32; 32];
    let mut values: Vec<u32> = (0..10).collect();
    let offsets: Vec<u32> = (0..10).collect();
    <RangeScatter<2, 4, 2>>::new()
        .scatter_range(&mut dest, &mut values, &offsets, None)
        .unwrap();
    assert_eq!(&dest[..10], &(0..10).collect::<Vec<u32>>()[..]);
    assert!(dest[10..].iter().all(|&v| v == 0));
}

#[test]
fn test_complex_conjugate_with_cache_hint() {
    let lane_values = [[Complex64::new(1.0, 2.0), Complex64::new(-3.0, 0.5)]];
    let offsets = [[1usize, 0]];
    let mut dest = vec![Complex64::new(0.0, 0.0); 2];
    let mut data = lane_values;
    unsafe {
        TileScatter::<1, 2, 1, StoreCg>::new(0).scatter_with(
            dest.as_mut_ptr(),
            &mut data,
            &offsets,
            &mut Conj,
            None,
        )
    };
    assert_eq!(dest[1], Complex64::new(1.0, -2.0));
    assert_eq!(dest[0], Complex64::new(-3.0, -0.5));
    assert!(!<Conj as TileTransform<Complex64>>::IS_IDENTITY);
}

#[test]
fn test_range_matches_reference_scatter() {
    let mut rng = StdRng::seed_from_u64(23);
    let n = 1000;
    let dest_len = 1500;
    let mut values: Vec<i64> = (0..n).map(|_| rng.gen_range(0..1_000_000)).collect();
    let original = values.clone();
    let offsets = shuffled_offsets(&mut rng, n, dest_len);
    let flags: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.7)).collect();

    let mut reference = vec![-1i64; dest_len];
    for i in 0..n {
        if flags[i] {
            reference[offsets[i]] = original[i] + 5;
        }
    }

    let mut dest = vec![-1i64; dest_len];
    <RangeScatter<4, 2, 8>>::new()
        .scatter_range_with(&mut dest, &mut values, &offsets, Some(&flags[..]), |v: &mut i64| {
            *v += 5
        })
        .unwrap();

    assert_eq!(dest, reference);
    for i in 0..n {
        let expected = if flags[i] { original[i] + 5 } else { original[i] };
        assert_eq!(values[i], expected);
    }
}
