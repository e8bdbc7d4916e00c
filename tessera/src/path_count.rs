// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Counting walk: a DDA over each line's tile crossings.
//!
//! First of the two walks over the flattened geometry. It only counts —
//! per-tile segment counts, per-tile winding deltas, and one bridge record
//! per crossing so the tiling walk can later place clipped segments without
//! re-discovering the allocation order.

use crate::math::{ONE_MINUS_ULP, ROBUST_EPSILON, Vec2, span};
use crate::tile::{BumpAllocators, FlatLine, PathBbox, SegmentCount, TILE_SCALE, Tile};

pub(crate) fn path_count(
    bump: &mut BumpAllocators,
    lines: &[FlatLine],
    bbox: PathBbox,
    tiles: &mut [Tile],
    seg_counts: &mut [SegmentCount],
) {
    for (line_ix, line) in lines.iter().enumerate() {
        if !line.is_finite() {
            // NaN comparisons would walk the line into unrelated tiles.
            continue;
        }
        let p0 = Vec2::from_array(line.p0);
        let p1 = Vec2::from_array(line.p1);
        // Normalize to run downward, remembering the original orientation.
        let is_down = p1.y >= p0.y;
        let (xy0, xy1) = if is_down { (p0, p1) } else { (p1, p0) };
        let s0 = xy0 * TILE_SCALE;
        let s1 = xy1 * TILE_SCALE;
        let count_x = span(s0.x, s1.x) - 1;
        let count = count_x + span(s0.y, s1.y);

        let dx = (s1.x - s0.x).abs();
        let dy = s1.y - s0.y;
        if dx + dy == 0.0 {
            // Zero-extent segment: no winding information.
            continue;
        }
        if dy == 0.0 && s0.y.floor() == s0.y {
            // Exactly horizontal on a tile boundary; crossing enumeration
            // would divide by zero and the segment contributes nothing.
            continue;
        }
        let idxdy = 1.0 / (dx + dy);
        let mut a = dx * idxdy;
        let is_positive_slope = s1.x >= s0.x;
        let sign = if is_positive_slope { 1.0 } else { -1.0 };
        let xt0 = (s0.x * sign).floor();
        let c = s0.x * sign - xt0;
        let y0 = s0.y.floor();
        let ytop = if s0.y == s1.y { s0.y.ceil() } else { y0 + 1.0 };
        let b = ((dy * c + dx * (ytop - s0.y)) * idxdy).min(ONE_MINUS_ULP);
        // Deterministic epsilon correction: if the backward check disagrees
        // with the expected crossing count, the slope is off by a few ulp.
        let robust_err = (a * (count as f32 - 1.0) + b).floor() - count_x as f32;
        if robust_err != 0.0 {
            a -= ROBUST_EPSILON.copysign(robust_err);
        }
        let x0 = xt0 * sign + if is_positive_slope { 0.0 } else { -1.0 };

        let xmin = s0.x.min(s1.x);
        let stride = bbox.width();
        if s0.y >= bbox.y1 as f32 || s1.y < bbox.y0 as f32 || xmin >= bbox.x1 as f32 || stride == 0
        {
            continue;
        }
        // Clip the walk to the bounding box. Clipping is done in "i" space.
        let mut imin = 0;
        if s0.y < bbox.y0 as f32 {
            let mut iminf = ((bbox.y0 as f32 - y0 + b - a) / (1.0 - a)).round() - 1.0;
            if y0 + iminf - (a * iminf + b).floor() < bbox.y0 as f32 {
                iminf += 1.0;
            }
            imin = iminf as u32;
        }
        let mut imax = count;
        if s1.y > bbox.y1 as f32 {
            let mut imaxf = ((bbox.y1 as f32 - y0 + b - a) / (1.0 - a)).round() - 1.0;
            if y0 + imaxf - (a * imaxf + b).floor() < bbox.y1 as f32 {
                imaxf += 1.0;
            }
            imax = imaxf as u32;
        }
        let delta = if is_down { -1 } else { 1 };
        let mut ymin = 0;
        let mut ymax = 0;
        if s0.x.max(s1.x) < bbox.x0 as f32 {
            // Entirely left of the bbox: pure backdrop update on the rows the
            // segment spans, no enumerated crossings.
            ymin = s0.y.ceil() as i32;
            ymax = s1.y.ceil() as i32;
            imax = imin;
        } else {
            let fudge = if is_positive_slope { 0.0 } else { 1.0 };
            if xmin < bbox.x0 as f32 {
                let mut f = ((sign * (bbox.x0 as f32 - x0) - b + fudge) / a).round();
                if (x0 + sign * (a * f + b).floor() < bbox.x0 as f32) == is_positive_slope {
                    f += 1.0;
                }
                let ynext = (y0 + f - (a * f + b).floor() + 1.0) as i32;
                if is_positive_slope {
                    if f as u32 > imin {
                        ymin = (y0 + if y0 == s0.y { 0.0 } else { 1.0 }) as i32;
                        ymax = ynext;
                        imin = f as u32;
                    }
                } else if (f as u32) < imax {
                    ymin = ynext;
                    ymax = s1.y.ceil() as i32;
                    imax = f as u32;
                }
            }
            if s0.x.max(s1.x) > bbox.x1 as f32 {
                let mut f = ((sign * (bbox.x1 as f32 - x0) - b + fudge) / a).round();
                if (x0 + sign * (a * f + b).floor() < bbox.x1 as f32) == is_positive_slope {
                    f += 1.0;
                }
                if is_positive_slope {
                    imax = imax.min(f as u32);
                } else {
                    imin = imin.max(f as u32);
                }
            }
        }
        imax = imin.max(imax);
        ymin = ymin.max(bbox.y0);
        ymax = ymax.min(bbox.y1);
        for y in ymin..ymax {
            let base = (y - bbox.y0) * stride;
            tiles[base as usize].backdrop += delta;
        }
        let mut last_z = (a * (imin as f32 - 1.0) + b).floor();
        let seg_base = bump.seg_counts;
        bump.seg_counts += imax - imin;
        assert!(
            bump.seg_counts as usize <= seg_counts.len(),
            "segment-count scratch undersized: the sizing bound must use the same span() as this walk"
        );
        for i in imin..imax {
            let zf = a * i as f32 + b;
            let z = zf.floor();
            let y = (y0 + i as f32 - z) as i32;
            let x = (x0 + sign * z) as i32;
            let base = (y - bbox.y0) * stride - bbox.x0;
            // A segment entering from directly above (rather than from a
            // side) seeds the winding of the tile to the right.
            let top_edge = if i == 0 { y0 == s0.y } else { last_z == z };
            if top_edge && x + 1 < bbox.x1 {
                let x_bump = (x + 1).max(bbox.x0);
                tiles[(base + x_bump) as usize].backdrop += delta;
            }
            let tile = &mut tiles[(base + x) as usize];
            let slot_within_tile = tile.count;
            tile.count += 1;
            seg_counts[(seg_base + i - imin) as usize] =
                SegmentCount::pack(line_ix as u32, slot_within_tile, i);
            last_z = z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::path_count;
    use crate::tile::{BumpAllocators, FlatLine, PathBbox, SegmentCount, Tile};

    fn run(lines: &[FlatLine], bbox: PathBbox) -> (BumpAllocators, Vec<Tile>, Vec<SegmentCount>) {
        let mut bump = BumpAllocators::default();
        bump.lines = lines.len() as u32;
        let mut tiles = vec![Tile::default(); bbox.tile_count()];
        // Generous bound; the rasterizer computes the tight one.
        let mut seg_counts = vec![SegmentCount::default(); 4 * bbox.tile_count() + 16];
        path_count(&mut bump, lines, bbox, &mut tiles, &mut seg_counts);
        (bump, tiles, seg_counts)
    }

    fn closed_rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<FlatLine> {
        vec![
            FlatLine::new([x0, y0], [x1, y0]),
            FlatLine::new([x1, y0], [x1, y1]),
            FlatLine::new([x1, y1], [x0, y1]),
            FlatLine::new([x0, y1], [x0, y0]),
        ]
    }

    #[test]
    fn counts_match_bridge_entries() {
        let bbox = PathBbox {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 4,
        };
        let (bump, tiles, _) = run(&closed_rect(5.0, 5.0, 59.0, 59.0), bbox);
        let total: u32 = tiles.iter().map(|t| t.count).sum();
        assert_eq!(total, bump.seg_counts);
        assert!(total > 0);
    }

    #[test]
    fn degenerate_lines_are_filtered() {
        let bbox = PathBbox {
            x0: 0,
            y0: 0,
            x1: 2,
            y1: 2,
        };
        let lines = [
            // Zero extent.
            FlatLine::new([8.0, 8.0], [8.0, 8.0]),
            // Horizontal at integer tile Y.
            FlatLine::new([1.0, 16.0], [30.0, 16.0]),
        ];
        let (bump, tiles, _) = run(&lines, bbox);
        assert_eq!(bump.seg_counts, 0);
        assert!(tiles.iter().all(|t| t.count == 0 && t.backdrop == 0));
    }

    #[test]
    fn non_finite_lines_are_filtered() {
        let bbox = PathBbox {
            x0: 0,
            y0: 0,
            x1: 2,
            y1: 2,
        };
        let lines = [
            FlatLine::new([f32::NAN, 4.0], [12.0, 20.0]),
            FlatLine::new([f32::NAN, f32::NAN], [f32::NAN, f32::NAN]),
            FlatLine::new([4.0, f32::INFINITY], [12.0, 20.0]),
            FlatLine::new([f32::NEG_INFINITY, 4.0], [12.0, f32::INFINITY]),
        ];
        let (bump, tiles, _) = run(&lines, bbox);
        assert_eq!(bump.seg_counts, 0);
        assert!(tiles.iter().all(|t| t.count == 0 && t.backdrop == 0));
    }

    #[test]
    fn left_of_bbox_lines_update_backdrop_only() {
        let bbox = PathBbox {
            x0: 2,
            y0: 0,
            x1 : 4,
            y1: 2,
        };
        // A downward edge well left of the bbox: winding enters every row
        // from outside, at the leftmost column.
        let lines = [FlatLine::new([3.0, 0.0], [3.0, 32.0])];
        let (bump, tiles, _) = run(&lines, bbox);
        assert_eq!(bump.seg_counts, 0);
        let stride = bbox.width() as usize;
        for row in 0..bbox.height() as usize {
            assert_eq!(tiles[row * stride].backdrop, -1);
            for col in 1..stride {
                assert_eq!(tiles[row * stride + col].backdrop, 0);
            }
        }
    }

    #[test]
    fn contained_shape_leaves_left_column_untouched() {
        // For a closed shape fully inside the bbox, no winding enters a row
        // from outside: the leftmost column's delta stays zero. (Interior
        // columns do receive top-entry bumps; those are the seed values the
        // backdrop prefix sum propagates rightward.)
        let bbox = PathBbox {
            x0: 0,
            y0: 0,
            x1: 4,
            y1: 4,
        };
        let (_, tiles, _) = run(&closed_rect(3.0, 3.0, 61.0, 61.0), bbox);
        let stride = bbox.width() as usize;
        for row in 0..bbox.height() as usize {
            assert_eq!(tiles[row * stride].backdrop, 0, "row {row}");
        }
    }
}
