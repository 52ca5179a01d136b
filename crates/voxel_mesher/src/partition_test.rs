use super::*;

fn assert_exact_tiling(extents: [usize; 3], block_size: usize) {
  let blocks = partition_blocks(extents, block_size).expect("partition");
  let mut hits = vec![0u8; extents[0] * extents[1] * extents[2]];

  for block in &blocks {
    assert!(block.check_within(extents).is_ok(), "{:?}", block);
    for x in block.min[0]..=block.max[0] {
      for y in block.min[1]..=block.max[1] {
        for z in block.min[2]..=block.max[2] {
          hits[(x * extents[1] + y) * extents[2] + z] += 1;
        }
      }
    }
  }

  assert!(
    hits.iter().all(|&h| h == 1),
    "extents {:?} with block size {} not tiled exactly once",
    extents,
    block_size
  );
}

#[test]
fn test_blocks_tile_range_exactly() {
  for extents in [[1, 1, 1], [7, 3, 5], [20, 20, 20], [41, 19, 22], [45, 2, 61]] {
    for block_size in [1, 3, 7, 20, 64] {
      assert_exact_tiling(extents, block_size);
    }
  }
}

#[test]
fn test_axis_spans_distribute_remainder_first() {
  assert_eq!(axis_spans(41, 20), vec![(0, 13), (14, 27), (28, 40)]);
  assert_eq!(axis_spans(45, 20), vec![(0, 14), (15, 29), (30, 44)]);
  assert_eq!(axis_spans(5, 20), vec![(0, 4)]);
  assert!(axis_spans(0, 20).is_empty());
}

#[test]
fn test_block_sizes_differ_by_at_most_one() {
  for n in 1..80 {
    let spans = axis_spans(n, 9);
    let lens: Vec<_> = spans.iter().map(|(a, b)| b - a + 1).collect();
    let min = *lens.iter().min().unwrap();
    let max = *lens.iter().max().unwrap();
    assert!(max - min <= 1, "n = {}: {:?}", n, lens);
    assert!(max <= 9);
    // Larger blocks come first.
    assert!(lens.windows(2).all(|w| w[0] >= w[1]));
  }
}

#[test]
fn test_partition_order_is_x_major() {
  let blocks = partition_blocks([4, 4, 4], 2).unwrap();
  assert_eq!(blocks.len(), 8);
  assert_eq!(blocks[0].min, [0, 0, 0]);
  assert_eq!(blocks[1].min, [0, 0, 2]);
  assert_eq!(blocks[2].min, [0, 2, 0]);
  assert_eq!(blocks[4].min, [2, 0, 0]);
  for (i, block) in blocks.iter().enumerate() {
    assert_eq!(block.index, i);
  }
}

#[test]
fn test_zero_block_size_is_rejected() {
  assert!(matches!(
    partition_blocks([4, 4, 4], 0),
    Err(MeshError::InvalidConfig(_))
  ));
}

#[test]
fn test_empty_extents_yield_no_blocks() {
  assert!(partition_blocks([0, 5, 5], 4).unwrap().is_empty());
  assert_eq!(cell_extents([0, 5, 5]), [0, 0, 0]);
  assert_eq!(cell_extents([3, 4, 5]), [4, 5, 6]);
}

#[test]
fn test_check_within_rejects_out_of_range() {
  let block = Block::new(0, [0, 0, 0], [4, 1, 1]);
  assert!(block.check_within([5, 2, 2]).is_ok());
  assert!(matches!(
    block.check_within([4, 2, 2]),
    Err(MeshError::BlockOutOfRange { .. })
  ));
  let inverted = Block::new(0, [2, 0, 0], [1, 1, 1]);
  assert!(inverted.check_within([5, 5, 5]).is_err());
}

#[test]
fn test_block_dims_and_contains() {
  let block = Block::new(3, [2, 4, 6], [3, 4, 9]);
  assert_eq!(block.dims(), [2, 1, 4]);
  assert_eq!(block.cell_count(), 8);
  assert!(block.contains([3, 4, 9]));
  assert!(!block.contains([1, 4, 9]));
}
