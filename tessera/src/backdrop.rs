// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backdrop accumulation: row-wise prefix sum of winding deltas.

use crate::tile::{PathBbox, Tile};

/// Replaces each tile's winding delta with the running sum across its row.
///
/// After this pass a tile's `backdrop` is the cumulative winding number
/// immediately to its left — the value the fine stage seeds every pixel
/// accumulator with.
pub(crate) fn accumulate_backdrops(bbox: PathBbox, tiles: &mut [Tile]) {
    let width = bbox.width();
    let height = bbox.height();
    for y in 0..height {
        let mut sum = 0;
        for x in 0..width {
            let tile = &mut tiles[(y * width + x) as usize];
            sum += tile.backdrop;
            tile.backdrop = sum;
        }
    }
}
