// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline orchestration: drives the six stages over one path.

use log::debug;
use peniko::Fill;
use peniko::kurbo::{CubicBez, Line, Point};

use crate::backdrop::accumulate_backdrops;
use crate::coarse::allocate_segments;
use crate::fine::fill_tile;
use crate::flatten::{Cubic, IntBbox, flatten_cubic};
use crate::math::{Vec2, span};
use crate::tile::{
    BumpAllocators, FlatLine, PathBbox, PathSegment, SegmentCount, TILE_AREA, TILE_HEIGHT,
    TILE_SCALE, TILE_WIDTH, Tile,
};

/// Geometry accepted by [`Rasterizer::rasterize`].
///
/// Either curves to be flattened, or lines a caller has already produced
/// (the polygon fast path, which skips stage 1 entirely).
#[derive(Clone, Copy, Debug)]
pub enum PathGeometry<'a> {
    /// An ordered list of cubic Béziers in device-pixel coordinates.
    Cubics(&'a [CubicBez]),
    /// An ordered list of pre-flattened polygon edges.
    Lines(&'a [Line]),
}

/// Default flattening tolerance in device pixels.
pub const DEFAULT_TOLERANCE: f32 = 0.25;

/// Converts one filled path into a per-pixel coverage field.
///
/// Owns the scratch buffers for a single path's run; they are reset (not
/// reallocated) on every call, and no other state persists between calls.
/// Unrelated paths are fully independent: one `Rasterizer` per thread
/// parallelizes across paths with no coordination.
#[derive(Debug, Default)]
pub struct Rasterizer {
    tolerance: f32,
    lines: Vec<FlatLine>,
    tiles: Vec<Tile>,
    seg_counts: Vec<SegmentCount>,
    segments: Vec<PathSegment>,
    bump: BumpAllocators,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    /// A rasterizer with a non-default flattening tolerance.
    pub fn with_tolerance(tolerance: f32) -> Self {
        assert!(tolerance > 0.0, "flattening tolerance must be positive");
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Rasterizes `geometry` onto a fresh `width * height` coverage buffer.
    ///
    /// The result is row-major, one `f32` in `[0, 1]` per pixel.
    pub fn rasterize(
        &mut self,
        geometry: PathGeometry<'_>,
        fill_rule: Fill,
        width: usize,
        height: usize,
    ) -> Vec<f32> {
        let mut coverage = vec![0.0; width * height];
        self.rasterize_into(geometry, fill_rule, width, height, &mut coverage);
        coverage
    }

    /// Rasterizes `geometry`, overwriting `coverage` (len `width * height`).
    pub fn rasterize_into(
        &mut self,
        geometry: PathGeometry<'_>,
        fill_rule: Fill,
        width: usize,
        height: usize,
        coverage: &mut [f32],
    ) {
        assert_eq!(
            coverage.len(),
            width * height,
            "coverage buffer must be width * height"
        );
        coverage.fill(0.0);
        if width == 0 || height == 0 {
            return;
        }

        // Stage 1: flatten into device-space lines, growing the pixel bbox.
        self.bump.reset();
        self.lines.clear();
        let mut pixel_bbox = IntBbox::default();
        match geometry {
            PathGeometry::Cubics(cubics) => {
                for cubic in cubics {
                    flatten_cubic(
                        Cubic {
                            p0: point_to_vec2(cubic.p0),
                            p1: point_to_vec2(cubic.p1),
                            p2: point_to_vec2(cubic.p2),
                            p3: point_to_vec2(cubic.p3),
                        },
                        self.tolerance,
                        &mut self.lines,
                        &mut pixel_bbox,
                    );
                }
            }
            PathGeometry::Lines(lines) => {
                for line in lines {
                    let p0 = point_to_vec2(line.p0);
                    let p1 = point_to_vec2(line.p1);
                    pixel_bbox.add_pt(p0);
                    pixel_bbox.add_pt(p1);
                    self.lines.push(FlatLine::new(p0.to_array(), p1.to_array()));
                }
            }
        }
        self.bump.lines = self.lines.len() as u32;
        if self.lines.is_empty() {
            return;
        }

        // The path's tile bbox: pixel extent clamped to the canvas.
        let x0 = pixel_bbox.x0.clamp(0, width as i32);
        let y0 = pixel_bbox.y0.clamp(0, height as i32);
        let x1 = pixel_bbox.x1.clamp(0, width as i32);
        let y1 = pixel_bbox.y1.clamp(0, height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let bbox = PathBbox {
            x0: x0 / TILE_WIDTH as i32,
            y0: y0 / TILE_HEIGHT as i32,
            x1: (x1 + TILE_WIDTH as i32 - 1) / TILE_WIDTH as i32,
            y1: (y1 + TILE_HEIGHT as i32 - 1) / TILE_HEIGHT as i32,
        };

        // All scratch is sized here, before any stage runs; nothing may grow
        // mid-pipeline. The crossing bound must agree with the counting
        // walk's span() arithmetic.
        self.tiles.clear();
        self.tiles.resize(bbox.tile_count(), Tile::default());
        let mut max_crossings = 0u32;
        for line in &self.lines {
            // Non-finite lines are dropped by the counting walk; a
            // saturated span() here would overflow the bound.
            if !line.is_finite() {
                continue;
            }
            let s0 = Vec2::from_array(line.p0) * TILE_SCALE;
            let s1 = Vec2::from_array(line.p1) * TILE_SCALE;
            max_crossings += span(s0.x, s1.x) - 1 + span(s0.y, s1.y);
        }
        self.seg_counts.clear();
        self.seg_counts
            .resize(max_crossings as usize, SegmentCount::default());
        debug!(
            "path: {} lines, {}x{} tiles, <= {max_crossings} crossings",
            self.bump.lines,
            bbox.width(),
            bbox.height(),
        );

        // Stages 2-5.
        crate::path_count::path_count(
            &mut self.bump,
            &self.lines,
            bbox,
            &mut self.tiles,
            &mut self.seg_counts,
        );
        self.bump.segments = allocate_segments(&mut self.tiles);
        self.segments.clear();
        self.segments
            .resize(self.bump.segments as usize, PathSegment::default());
        crate::path_tiling::path_tiling(
            &self.bump,
            &self.seg_counts,
            &self.lines,
            bbox,
            &self.tiles,
            &mut self.segments,
        );
        accumulate_backdrops(bbox, &mut self.tiles);

        // Stage 6: per-tile coverage, stitched into the canvas raster.
        let mut area = [0.0; TILE_AREA];
        for ty in 0..bbox.height() {
            for tx in 0..bbox.width() {
                let tile = self.tiles[(ty * bbox.width() + tx) as usize];
                let segments = match tile.start {
                    Some(start) => {
                        &self.segments[start as usize..(start + tile.count) as usize]
                    }
                    None => {
                        if tile.backdrop == 0 {
                            // Nothing can contribute; the raster stays 0.
                            continue;
                        }
                        &[]
                    }
                };
                fill_tile(segments, tile.backdrop, fill_rule, &mut area);

                let px0 = (bbox.x0 + tx) as usize * TILE_WIDTH;
                let py0 = (bbox.y0 + ty) as usize * TILE_HEIGHT;
                let cols = TILE_WIDTH.min(width - px0.min(width));
                for yi in 0..TILE_HEIGHT {
                    let py = py0 + yi;
                    if py >= height {
                        break;
                    }
                    let src = &area[yi * TILE_WIDTH..yi * TILE_WIDTH + cols];
                    let dst = &mut coverage[py * width + px0..py * width + px0 + cols];
                    dst.copy_from_slice(src);
                }
            }
        }
    }
}

fn point_to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}
