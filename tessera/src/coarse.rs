// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coarse allocation: prefix-sums tile counts into segment slice offsets.

use crate::tile::Tile;

/// Assigns each non-empty tile its start offset into the segment array.
///
/// Walks the tile array in row-major bbox order; returns the total segment
/// count, which is exactly the sum of all per-tile counts. Empty tiles keep
/// `start = None`.
pub(crate) fn allocate_segments(tiles: &mut [Tile]) -> u32 {
    let mut total = 0;
    for tile in tiles.iter_mut() {
        if tile.count > 0 {
            tile.start = Some(total);
            total += tile.count;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::allocate_segments;
    use crate::tile::Tile;

    #[test]
    fn offsets_are_compact_and_ordered() {
        let mut tiles = vec![Tile::default(); 5];
        tiles[1].count = 3;
        tiles[3].count = 2;
        tiles[4].count = 1;
        let total = allocate_segments(&mut tiles);
        assert_eq!(total, 6);
        assert_eq!(tiles[0].start, None);
        assert_eq!(tiles[1].start, Some(0));
        assert_eq!(tiles[2].start, None);
        assert_eq!(tiles[3].start, Some(3));
        assert_eq!(tiles[4].start, Some(5));
    }
}
