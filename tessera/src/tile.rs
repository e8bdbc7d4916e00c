// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data model shared between pipeline stages.
//!
//! `FlatLine`, `SegmentCount` and `PathSegment` are plain-old-data records
//! whose layouts double as the wire contract with a compute-shader
//! implementation of the same pipeline, so their sizes are pinned with static
//! assertions. `Tile` is CPU-only state and uses explicit fields instead of
//! the packed count-or-index encoding a GPU layout would share.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Fixed tile width in pixels.
pub const TILE_WIDTH: usize = 16;
/// Fixed tile height in pixels.
pub const TILE_HEIGHT: usize = 16;
/// Pixels per tile.
pub const TILE_AREA: usize = TILE_WIDTH * TILE_HEIGHT;

/// Device pixels to tile units.
pub(crate) const TILE_SCALE: f32 = 1.0 / TILE_WIDTH as f32;

/// A flattened line segment in absolute device-space coordinates.
///
/// Produced by the flattener (or ingested directly on the polygon fast path)
/// and consumed by both tile walks.
#[derive(Clone, Copy, Debug, Zeroable, Pod, Default)]
#[repr(C)]
pub struct FlatLine {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
}

impl FlatLine {
    pub fn new(p0: [f32; 2], p1: [f32; 2]) -> Self {
        Self { p0, p1 }
    }

    /// Whether all four coordinates are finite.
    ///
    /// Non-finite lines carry no winding information and are dropped by the
    /// counting walk like other degenerate geometry.
    pub fn is_finite(self) -> bool {
        self.p0[0].is_finite()
            && self.p0[1].is_finite()
            && self.p1[0].is_finite()
            && self.p1[1].is_finite()
    }
}

/// Bridge record between the counting and tiling walks.
///
/// One entry per tile crossing, in walk order. `counts` packs the slot of the
/// crossing within its tile (high half) and within its line (low half).
#[derive(Clone, Copy, Debug, Zeroable, Pod, Default)]
#[repr(C)]
pub struct SegmentCount {
    pub line_ix: u32,
    pub counts: u32,
}

impl SegmentCount {
    /// Capacity of each packed half.
    pub const SLOT_LIMIT: u32 = 1 << 16;

    /// Packs the two slot indices, asserting the 16-bit capacity invariant.
    ///
    /// A line spanning more than 65535 tiles in one direction (or a tile
    /// receiving that many crossings) exceeds the format and is a caller
    /// defect, not a silent wraparound.
    pub(crate) fn pack(line_ix: u32, slot_within_tile: u32, slot_within_line: u32) -> Self {
        assert!(
            slot_within_tile < Self::SLOT_LIMIT && slot_within_line < Self::SLOT_LIMIT,
            "tile crossing slot overflow: {slot_within_tile} within tile, {slot_within_line} within line"
        );
        Self {
            line_ix,
            counts: (slot_within_tile << 16) | slot_within_line,
        }
    }

    pub(crate) fn slot_within_tile(self) -> u32 {
        self.counts >> 16
    }

    pub(crate) fn slot_within_line(self) -> u32 {
        self.counts & 0xffff
    }
}

/// A line segment clipped to one tile, in tile-relative coordinates.
///
/// `y_edge` is the tile-relative y at which the segment, extended if
/// necessary, crosses the tile's left edge, or [`Self::Y_EDGE_NONE`] if it
/// never does within the tile.
#[derive(Clone, Copy, Debug, Zeroable, Pod, Default)]
#[repr(C)]
pub struct PathSegment {
    pub point0: [f32; 2],
    pub point1: [f32; 2],
    pub y_edge: f32,
    pub _padding: u32,
}

impl PathSegment {
    /// Sentinel `y_edge` for segments that do not cross the tile's left edge.
    pub const Y_EDGE_NONE: f32 = 1e9;
}

// Wire-contract layouts.
const_assert_eq!(std::mem::size_of::<SegmentCount>(), 8);
const_assert_eq!(std::mem::size_of::<PathSegment>(), 24);

/// Per-tile rasterization state.
///
/// `backdrop` starts as the winding delta contributed by geometry entering
/// the tile from the left and becomes, after accumulation, the winding number
/// at the tile's left edge. `count` is written by the counting walk; `start`
/// is assigned by the coarse allocator for tiles that received any crossings.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tile {
    pub backdrop: i32,
    pub count: u32,
    pub start: Option<u32>,
}

/// Integer tile-space bounding box of the path being rasterized.
///
/// Clamped to the canvas; the tile array covers exactly this rectangle in
/// row-major order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathBbox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PathBbox {
    pub fn width(self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> i32 {
        self.y1 - self.y0
    }

    pub fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn tile_count(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }
}

/// Monotonic allocation counters scoping one path's run.
///
/// Reset before every path; never process-wide state.
#[derive(Clone, Copy, Debug, Default)]
pub struct BumpAllocators {
    /// Flattened lines produced by stage 1.
    pub lines: u32,
    /// `SegmentCount` slots consumed by the counting walk.
    pub seg_counts: u32,
    /// Total clipped segments allocated by the coarse pass.
    pub segments: u32,
}

impl BumpAllocators {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::SegmentCount;

    #[test]
    fn segment_count_round_trips() {
        let sc = SegmentCount::pack(7, 300, 5);
        assert_eq!(sc.line_ix, 7);
        assert_eq!(sc.slot_within_tile(), 300);
        assert_eq!(sc.slot_within_line(), 5);
    }

    #[test]
    #[should_panic(expected = "slot overflow")]
    fn segment_count_overflow_asserts() {
        let _ = SegmentCount::pack(0, 0x10000, 0);
    }
}
