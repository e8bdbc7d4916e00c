// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fine rasterization: analytic per-pixel coverage for one tile.
//!
//! Pure function of one tile's segment slice, resolved backdrop and the fill
//! rule; writes only its own 16×16 output. This is the pipeline's natural
//! unit of parallelism — no stage state is shared between tiles.

use peniko::Fill;

use crate::tile::{PathSegment, TILE_AREA, TILE_HEIGHT, TILE_WIDTH};

/// Computes coverage for one tile into `area` (row-major 16×16).
///
/// Every cell starts at the tile's backdrop winding. Each segment then
/// contributes, per pixel row, a flat winding term for crossings of the
/// tile's left edge plus the exact trapezoidal signed area between the
/// segment and the pixel's right edge. The raw winding field is finally
/// folded through the fill rule into `[0, 1]` coverage.
pub(crate) fn fill_tile(
    segments: &[PathSegment],
    backdrop: i32,
    fill_rule: Fill,
    area: &mut [f32; TILE_AREA],
) {
    let backdrop_f = backdrop as f32;
    for a in area.iter_mut() {
        *a = backdrop_f;
    }
    for segment in segments {
        let delta = [
            segment.point1[0] - segment.point0[0],
            segment.point1[1] - segment.point0[1],
        ];
        for yi in 0..TILE_HEIGHT {
            // Clip the segment's y extent to this pixel row.
            let y = segment.point0[1] - yi as f32;
            let y0 = y.clamp(0.0, 1.0);
            let y1 = (y + delta[1]).clamp(0.0, 1.0);
            let dy = y0 - y1;
            // Winding for the row's full width when the extended segment
            // crosses the tile's left edge in this row; sign from the
            // horizontal direction.
            let y_edge = delta[0].signum() * (yi as f32 - segment.y_edge + 1.0).clamp(0.0, 1.0);
            if dy != 0.0 {
                let vec_y_recip = delta[1].recip();
                let t0 = (y0 - y) * vec_y_recip;
                let t1 = (y1 - y) * vec_y_recip;
                let startx = segment.point0[0];
                let x0 = startx + t0 * delta[0];
                let x1 = startx + t1 * delta[0];
                let xmin0 = x0.min(x1);
                let xmax0 = x0.max(x1);
                for i in 0..TILE_WIDTH {
                    let i_f = i as f32;
                    let xmin = (xmin0 - i_f).min(1.0) - 1.0e-6;
                    let xmax = xmax0 - i_f;
                    let b = xmax.min(1.0);
                    let c = b.max(0.0);
                    let d = xmin.max(0.0);
                    let a = (b + 0.5 * (d * d - c * c) - xmin) / (xmax - xmin);
                    area[yi * TILE_WIDTH + i] += y_edge + a * dy;
                }
            } else if y_edge != 0.0 {
                // Exactly horizontal within the row: flat term only.
                for i in 0..TILE_WIDTH {
                    area[yi * TILE_WIDTH + i] += y_edge;
                }
            }
        }
    }
    match fill_rule {
        Fill::NonZero => {
            for a in area.iter_mut() {
                *a = a.abs().min(1.0);
            }
        }
        Fill::EvenOdd => {
            // Triangle-wave fold of the winding number into [0, 1].
            for a in area.iter_mut() {
                *a = (*a - 2.0 * (0.5 * *a).round()).abs();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fill_tile;
    use crate::tile::{PathSegment, TILE_AREA, TILE_WIDTH};
    use peniko::Fill;

    fn seg(p0: [f32; 2], p1: [f32; 2], y_edge: f32) -> PathSegment {
        PathSegment {
            point0: p0,
            point1: p1,
            y_edge,
            _padding: 0,
        }
    }

    #[test]
    fn empty_tile_takes_backdrop() {
        let mut area = [0.0; TILE_AREA];
        fill_tile(&[], 1, Fill::NonZero, &mut area);
        assert!(area.iter().all(|&a| a == 1.0));
        fill_tile(&[], 2, Fill::EvenOdd, &mut area);
        assert!(area.iter().all(|&a| a == 0.0));
        fill_tile(&[], -1, Fill::NonZero, &mut area);
        assert!(area.iter().all(|&a| a == 1.0));
    }

    #[test]
    fn vertical_pair_fills_between() {
        // Downward edge at x = 4, upward edge at x = 12: winding +-1 between.
        let segments = [
            seg([4.0, 0.0], [4.0, 16.0], PathSegment::Y_EDGE_NONE),
            seg([12.0, 16.0], [12.0, 0.0], PathSegment::Y_EDGE_NONE),
        ];
        let mut area = [0.0; TILE_AREA];
        fill_tile(&segments, 0, Fill::NonZero, &mut area);
        for row in 0..16 {
            for col in 0..16 {
                let v = area[row * TILE_WIDTH + col];
                let expected = if (4..12).contains(&col) { 1.0 } else { 0.0 };
                assert!(
                    (v - expected).abs() < 1e-4,
                    "row {row} col {col}: {v} != {expected}"
                );
            }
        }
    }

    #[test]
    fn half_pixel_coverage_on_fractional_edge() {
        let segments = [
            seg([4.5, 0.0], [4.5, 16.0], PathSegment::Y_EDGE_NONE),
            seg([12.0, 16.0], [12.0, 0.0], PathSegment::Y_EDGE_NONE),
        ];
        let mut area = [0.0; TILE_AREA];
        fill_tile(&segments, 0, Fill::NonZero, &mut area);
        let v = area[8 * TILE_WIDTH + 4];
        assert!((v - 0.5).abs() < 1e-4, "boundary pixel: {v}");
    }

    #[test]
    fn fill_rules_diverge_on_double_winding() {
        // Two coincident downward edges: winding 2 to the right.
        let segments = [
            seg([4.0, 0.0], [4.0, 16.0], PathSegment::Y_EDGE_NONE),
            seg([4.0, 0.0], [4.0, 16.0], PathSegment::Y_EDGE_NONE),
        ];
        let mut nonzero = [0.0; TILE_AREA];
        let mut even_odd = [0.0; TILE_AREA];
        fill_tile(&segments, 0, Fill::NonZero, &mut nonzero);
        fill_tile(&segments, 0, Fill::EvenOdd, &mut even_odd);
        let ix = 8 * TILE_WIDTH + 10;
        assert!((nonzero[ix] - 1.0).abs() < 1e-4);
        assert!(even_odd[ix].abs() < 1e-4);
    }

    #[test]
    fn y_edge_contributes_full_rows() {
        // A segment crossing the left edge at y = 8, heading right: rows
        // below the crossing get a full winding bump across the tile.
        let segments = [seg([0.000001, 8.0], [8.0, 8.0], 8.0)];
        let mut area = [0.0; TILE_AREA];
        fill_tile(&segments, 0, Fill::NonZero, &mut area);
        // Row 12 is fully below the crossing; the horizontal segment itself
        // has no y extent there.
        for col in 0..16 {
            let v = area[12 * TILE_WIDTH + col];
            assert!((v - 1.0).abs() < 1e-4, "col {col}: {v}");
        }
        // Rows above the crossing stay empty.
        for col in 0..16 {
            let v = area[3 * TILE_WIDTH + col];
            assert!(v.abs() < 1e-4, "col {col}: {v}");
        }
    }
}
